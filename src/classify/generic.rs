//! Embeds that are neither platform videos nor channels.
//!
//! Probes run from strongest to weakest evidence of a player; the first positive one
//! decides. A page with substantial text but no player is given the benefit of the
//! doubt.

use tracing::debug;

use super::signals::{self, MediaState};
use super::{conclude, decode, load_and_settle, open_page, release, scripts, visible_text, CheckFault, ClassifierConfig};
use crate::browser::{is_truthy, Page, PageError, PageGateway};
use crate::types::Verdict;

const CONTEXT: &str = "Error checking embed";

/// Error wording only counts on pages shorter than this.
const ERROR_PAGE_MAX: usize = 500;
/// Pages with more text than this are assumed to host an interactive player.
const SUBSTANTIAL_TEXT: usize = 100;

pub const INTERACTION_NOTE: &str = "Page loaded but player may need interaction";

pub async fn check_generic(gateway: &dyn PageGateway, embed_url: &str, config: &ClassifierConfig) -> Result<Verdict, CheckFault> {
    let limit = config.generic_timeout;
    let page = open_page(gateway, CONTEXT).await?;
    let outcome = tokio::time::timeout(limit, probe(page.as_ref(), embed_url, config)).await;
    release(page.as_ref()).await;
    conclude(outcome, limit, CONTEXT)
}

async fn probe(page: &dyn Page, embed_url: &str, config: &ClassifierConfig) -> Result<Verdict, PageError> {
    load_and_settle(page, embed_url, config.settle).await?;

    let text = visible_text(page).await?;
    let len = signals::char_len(&text);
    if len < ERROR_PAGE_MAX {
        if let Some(phrase) = signals::first_match(&text, signals::GENERIC_ERROR_PHRASES) {
            return Ok(Verdict::broken(format!("Embed error: {}", phrase)));
        }
    }

    let media: MediaState = decode(page.evaluate(scripts::MEDIA_STATE).await?)?;
    if media.has_video {
        return Ok(media.video_verdict());
    }
    if media.has_frame {
        debug!(embed_url, "embed renders a frame");
        return Ok(Verdict::working());
    }
    if is_truthy(&page.evaluate(scripts::PLAYER_HINT).await?) {
        debug!(embed_url, "player-like element found");
        return Ok(Verdict::working());
    }
    if is_truthy(&page.evaluate(scripts::PLAY_CONTROL).await?) {
        debug!(embed_url, "play control found");
        return Ok(Verdict::working());
    }
    if let Some(hint) = signals::first_match(&text, signals::CAPABILITY_HINTS) {
        return Ok(Verdict::working_with(format!("Player needs browser capabilities ({})", hint)));
    }
    if len > SUBSTANTIAL_TEXT {
        return Ok(Verdict::working_with(INTERACTION_NOTE));
    }
    Ok(Verdict::broken("No video player found on page"))
}
