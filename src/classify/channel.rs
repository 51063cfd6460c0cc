//! TV channel embeds.

use tracing::debug;

use super::signals::{self, MediaState};
use super::{conclude, decode, load_and_settle, open_page, release, scripts, video, visible_text, CheckFault, ClassifierConfig};
use crate::browser::{is_truthy, Page, PageError, PageGateway};
use crate::types::Verdict;

const CONTEXT: &str = "Error checking channel";

/// Offline text on a page shorter than this is taken at face value.
const SHORT_PAGE: usize = 300;
/// Up to this length an offline phrase counts only if it recurs.
const MEDIUM_PAGE: usize = 500;

pub async fn check_channel(
    gateway: &dyn PageGateway,
    embed_url: &str,
    video_id: Option<&str>,
    config: &ClassifierConfig,
) -> Result<Verdict, CheckFault> {
    let limit = config.channel_timeout;
    let page = open_page(gateway, CONTEXT).await?;
    let outcome = tokio::time::timeout(limit, probe(page.as_ref(), embed_url, video_id, config)).await;
    release(page.as_ref()).await;
    conclude(outcome, limit, CONTEXT)
}

async fn probe(
    page: &dyn Page,
    embed_url: &str,
    video_id: Option<&str>,
    config: &ClassifierConfig,
) -> Result<Verdict, PageError> {
    load_and_settle(page, embed_url, config.settle).await?;

    if video_id.is_some() || signals::is_video_platform_url(embed_url) {
        debug!(embed_url, "channel is a video-platform embed");
        return video::inspect(page, config).await;
    }

    let text = visible_text(page).await?;
    if let Some(phrase) = offline_phrase(&text) {
        let player = is_truthy(&page.evaluate(scripts::PLAYER_PRESENT).await?);
        if !player && is_decisive(&text, phrase) {
            return Ok(Verdict::broken(format!("Channel appears offline: {}", phrase)));
        }
        debug!(embed_url, phrase, player, "ignoring incidental offline wording");
    }

    if signals::matches_allowlist(embed_url, &config.channel_allowlist) {
        return Ok(Verdict::working());
    }

    tokio::time::sleep(config.short_settle).await;
    let state: MediaState = decode(page.evaluate(scripts::MEDIA_STATE).await?)?;
    Ok(if !state.has_player() {
        Verdict::broken("No video element found")
    } else if state.has_video {
        state.video_verdict()
    } else {
        Verdict::working()
    })
}

fn offline_phrase(text: &str) -> Option<&'static str> { signals::first_match(text, signals::CHANNEL_OFFLINE_PHRASES) }

fn is_decisive(text: &str, phrase: &str) -> bool {
    let len = signals::char_len(text);
    len < SHORT_PAGE || (len < MEDIUM_PAGE && signals::occurrences(text, phrase) > 1)
}
