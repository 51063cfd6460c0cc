//! Video-platform (YouTube-style) embeds.
//!
//! A "watch on the platform" link means the video exists even if embedding is
//! restricted, so it counts in favour of the video. Restriction notices often render
//! after the player frame search gives up, hence the second scan.

use tracing::debug;

use super::signals::{self, FrameInfo};
use super::{as_text, conclude, decode, load_and_settle, open_page, release, scripts, visible_text, CheckFault, ClassifierConfig};
use crate::browser::{is_truthy, Page, PageError, PageGateway};
use crate::types::Verdict;

const CONTEXT: &str = "Error checking video";

pub(crate) const RESTRICTED_NOTE: &str = "Embedding restricted but video exists (watch on YouTube)";

pub async fn check_video(
    gateway: &dyn PageGateway,
    video_id: &str,
    embed_url: &str,
    config: &ClassifierConfig,
) -> Result<Verdict, CheckFault> {
    let limit = config.video_timeout;
    debug!(video_id, embed_url, "checking video");
    let page = open_page(gateway, CONTEXT).await?;
    let outcome = tokio::time::timeout(limit, async {
        load_and_settle(page.as_ref(), embed_url, config.settle).await?;
        inspect(page.as_ref(), config).await
    })
    .await;
    release(page.as_ref()).await;
    conclude(outcome, limit, CONTEXT)
}

/// Signals read from a rendered embed page.
#[derive(Debug, Default)]
struct Snapshot {
    text: String,
    markup: String,
    redirect: bool,
}

impl Snapshot {
    async fn capture(page: &dyn Page) -> Result<Self, PageError> {
        let text = visible_text(page).await?;
        let markup = as_text(page.evaluate(scripts::PAGE_MARKUP).await?).to_lowercase();
        let redirect = is_truthy(&page.evaluate(scripts::WATCH_REDIRECT).await?);
        Ok(Self { text, markup, redirect })
    }

    fn offers_watch_redirect(&self) -> bool {
        self.redirect
            || signals::first_match(&self.text, signals::RESTRICTION_NOTICES).is_some()
            || signals::first_match(&self.markup, signals::RESTRICTION_NOTICES).is_some()
    }

    /// A decisive verdict, or `None` when the page shows neither an error nor a redirect.
    fn assess(&self) -> Option<Verdict> {
        if let Some(phrase) = signals::terminal_video_error(&self.text) {
            return Some(Verdict::broken(format!("YouTube error: {}", phrase)));
        }
        if self.offers_watch_redirect() {
            return Some(Verdict::working_with(RESTRICTED_NOTE));
        }
        None
    }
}

/// Judge an already loaded and settled embed page.
pub(crate) async fn inspect(page: &dyn Page, config: &ClassifierConfig) -> Result<Verdict, PageError> {
    let first = Snapshot::capture(page).await?;
    if let Some(verdict) = first.assess() {
        return Ok(verdict);
    }

    match page.wait_for_selector(scripts::FRAME_SELECTOR, config.frame_wait).await {
        Ok(()) => {
            let frame: FrameInfo = decode(page.evaluate(scripts::FRAME_INFO).await?)?;
            Ok(if !frame.found {
                Verdict::broken("YouTube player not found")
            } else if frame.references_platform() {
                Verdict::working()
            } else {
                Verdict::broken("YouTube player not properly loaded")
            })
        }
        Err(e) if e.is_timeout() => {
            debug!("no player frame within {:?}, rescanning", config.frame_wait);
            let second = Snapshot::capture(page).await?;
            Ok(second.assess().unwrap_or_else(|| Verdict::broken("YouTube player did not load")))
        }
        Err(e) => Err(e),
    }
}
