//! Radio streams: load the stream into an `<audio>` element and watch its events.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{conclude, decode, open_page, release, scripts, CheckFault, ClassifierConfig};
use crate::browser::{Page, PageError, PageGateway};
use crate::types::Verdict;

const CONTEXT: &str = "Error checking stream";

/// Portion of the radio timeout kept back from the event wait so the verdict can
/// still be read before the whole-operation timeout fires.
const WAIT_RESERVE: Duration = Duration::from_secs(3);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StreamState {
    error: bool,
    error_message: Option<String>,
    loaded: bool,
    can_play: bool,
    ready_state: u8,
}

impl StreamState {
    fn verdict(self) -> Verdict {
        if self.error {
            let message = self.error_message.filter(|m| !m.trim().is_empty());
            return Verdict::broken(message.unwrap_or_else(|| "Audio stream error".to_string()));
        }
        // HAVE_CURRENT_DATA or better
        if self.loaded || self.can_play || self.ready_state >= 2 {
            return Verdict::working();
        }
        Verdict::broken("Stream did not load within timeout")
    }
}

pub async fn check_radio(gateway: &dyn PageGateway, url: &str, config: &ClassifierConfig) -> Result<Verdict, CheckFault> {
    let limit = config.radio_timeout;
    let page = open_page(gateway, CONTEXT).await?;
    let outcome = tokio::time::timeout(limit, probe(page.as_ref(), url, limit)).await;
    release(page.as_ref()).await;
    conclude(outcome, limit, CONTEXT)
}

async fn probe(page: &dyn Page, url: &str, limit: Duration) -> Result<Verdict, PageError> {
    page.set_content(&scripts::radio_page(url)).await?;
    page.evaluate(scripts::RADIO_START).await?;

    let wait = limit.saturating_sub(WAIT_RESERVE).max(Duration::from_secs(1));
    match page.wait_for_condition(scripts::RADIO_SETTLED, wait).await {
        Ok(()) => {}
        Err(e) if e.is_timeout() => debug!(url, "no audio event within {:?}", wait),
        Err(e) => return Err(e),
    }

    let state: StreamState = decode(page.evaluate(scripts::RADIO_STATE).await?)?;
    debug!(url, ?state, "radio state");
    Ok(state.verdict())
}
