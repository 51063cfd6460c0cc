//! Phrase tables and DOM-derived signals shared by the classifiers.

use serde::Deserialize;
use url::Url;

use crate::types::Verdict;

/// Platform messages meaning the video itself is gone or locked.
pub const VIDEO_ERROR_PHRASES: &[&str] = &[
    "private video",
    "this video is private",
    "this video does not exist",
    "video has been removed",
    "this video has been removed",
    "video has been deleted",
    "this video is not available",
    "this video is unavailable",
    "video unavailable",
    "playback error",
    "does not exist",
    "has been removed",
    "has been deleted",
];

/// Wording of the "embedding disabled, watch on the platform" notice.
pub const RESTRICTION_NOTICES: &[&str] = &[
    "playback on other websites has been disabled",
    "watch this video on youtube",
    "watch video on youtube",
    "watch on youtube",
];

/// Headlines that accompany a restriction notice and are not terminal on their own.
const RESTRICTION_HEADLINES: &[&str] = &["video unavailable", "this video is unavailable"];

/// Offline wording specific enough to not fire on ordinary page chrome.
pub const CHANNEL_OFFLINE_PHRASES: &[&str] = &[
    "channel is offline",
    "stream is offline",
    "currently offline",
    "is not live",
    "stream unavailable",
    "channel unavailable",
    "stream not found",
    "channel not found",
    "page not found",
    "404 not found",
    "content is not available",
    "not available in your",
    "this stream has ended",
    "error loading",
    "failed to load",
];

pub const GENERIC_ERROR_PHRASES: &[&str] =
    &["not available", "unavailable", "404", "not found", "access denied", "error loading"];

/// Text implying a player exists but needs capabilities the probe may lack.
pub const CAPABILITY_HINTS: &[&str] = &[
    "enable javascript",
    "upgrade your browser",
    "update your browser",
    "browser does not support",
    "html5 video",
];

const PLATFORM_HOSTS: &[&str] = &["youtube.com", "youtube-nocookie.com", "youtu.be"];

/// First phrase of `phrases` contained in `text`. `text` must already be lowercase.
pub fn first_match(text: &str, phrases: &[&'static str]) -> Option<&'static str> {
    phrases.iter().copied().find(|p| text.contains(p))
}

/// Terminal video error in lowercase `text`, ignoring restriction headlines when the
/// restriction notice itself is present.
pub fn terminal_video_error(text: &str) -> Option<&'static str> {
    let restricted = first_match(text, RESTRICTION_NOTICES).is_some();
    VIDEO_ERROR_PHRASES
        .iter()
        .copied()
        .find(|p| text.contains(p) && !(restricted && RESTRICTION_HEADLINES.contains(p)))
}

pub fn occurrences(text: &str, phrase: &str) -> usize { text.matches(phrase).count() }

pub fn char_len(text: &str) -> usize { text.chars().count() }

fn host_of(url: &str) -> Option<String> {
    Url::parse(url.trim()).ok()?.host_str().map(|h| h.to_ascii_lowercase())
}

/// Whether `host` is `domain` or one of its subdomains.
fn host_is(host: &str, domain: &str) -> bool {
    host == domain || host.strip_suffix(domain).is_some_and(|rest| rest.ends_with('.'))
}

pub fn is_video_platform_url(url: &str) -> bool {
    match host_of(url) {
        Some(host) => PLATFORM_HOSTS.iter().any(|d| host_is(&host, d)),
        None => {
            let lower = url.to_ascii_lowercase();
            PLATFORM_HOSTS.iter().any(|d| lower.contains(d))
        }
    }
}

/// Whether `url` belongs to one of the allowlisted hosts (exact host or subdomain;
/// falls back to substring matching for unparsable URLs).
pub fn matches_allowlist(url: &str, allowlist: &[String]) -> bool {
    let host = host_of(url);
    allowlist.iter().map(|a| a.trim().to_ascii_lowercase()).filter(|a| !a.is_empty()).any(|a| match &host {
        Some(h) => host_is(h, &a),
        None => url.to_ascii_lowercase().contains(&a),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrameInfo {
    pub found: bool,
    pub src: String,
}

impl FrameInfo {
    pub fn references_platform(&self) -> bool { !self.src.is_empty() && is_video_platform_url(&self.src) }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

/// MediaError.code for MEDIA_ERR_DECODE.
const MEDIA_ERR_DECODE: u16 = 3;

impl MediaError {
    pub fn is_decode(&self) -> bool {
        let m = self.message.to_ascii_lowercase();
        self.code == MEDIA_ERR_DECODE || m.contains("decode") || m.contains("decoding") || m.contains("pipeline")
    }

    pub fn describe(&self) -> String {
        if self.message.trim().is_empty() { format!("media error code {}", self.code) } else { self.message.clone() }
    }
}

/// Snapshot of the first `<video>` element (and whether any frame exists).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaState {
    pub has_video: bool,
    pub has_frame: bool,
    pub ready_state: u8,
    pub network_state: u8,
    pub src: String,
    pub error: Option<MediaError>,
}

impl MediaState {
    pub fn has_player(&self) -> bool { self.has_video || self.has_frame }

    /// Verdict for a page whose `<video>` element exists. Optimistic by default:
    /// many players only progress past readyState 0 after user interaction.
    pub fn video_verdict(&self) -> Verdict {
        let metadata = self.ready_state >= 1;
        match &self.error {
            Some(err) if err.is_decode() => {
                if metadata || !self.src.trim().is_empty() || self.network_state >= 1 {
                    Verdict::working_with(format!("Ignored decoder error: {}", err.describe()))
                } else {
                    Verdict::broken(format!("Video error: {}", err.describe()))
                }
            }
            Some(err) => {
                if metadata {
                    Verdict::working_with(format!("Video reported an error after loading metadata: {}", err.describe()))
                } else {
                    Verdict::broken(format!("Video error: {}", err.describe()))
                }
            }
            None => Verdict::working(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CheckStatus;
    use serde_json::json;

    fn state(v: serde_json::Value) -> MediaState { serde_json::from_value(v).unwrap() }

    #[test]
    fn restriction_headline_is_not_terminal_next_to_the_notice() {
        let text = "video unavailable playback on other websites has been disabled by the video owner watch on youtube";
        assert_eq!(terminal_video_error(text), None);
        assert_eq!(terminal_video_error("video unavailable"), Some("video unavailable"));
        assert_eq!(terminal_video_error("private video watch on youtube"), Some("private video"));
    }

    #[test]
    fn platform_urls_are_recognized_by_host() {
        assert!(is_video_platform_url("https://www.youtube.com/embed/abc"));
        assert!(is_video_platform_url("https://youtu.be/abc"));
        assert!(is_video_platform_url("https://www.youtube-nocookie.com/embed/abc"));
        assert!(!is_video_platform_url("https://notyoutube.com.example.org/embed"));
        assert!(!is_video_platform_url("https://player.vimeo.com/video/1"));
    }

    #[test]
    fn allowlist_matches_host_and_subdomains() {
        let list = vec!["player2.streamspot.com".to_string()];
        assert!(matches_allowlist("https://player2.streamspot.com/?playerId=x", &list));
        assert!(matches_allowlist("https://eu.player2.streamspot.com/x", &list));
        assert!(!matches_allowlist("https://streamspot.com/x", &list));
    }

    #[test]
    fn decode_errors_with_recovery_signals_are_tolerated() {
        let s = state(json!({"hasVideo": true, "readyState": 0, "networkState": 2, "src": "",
            "error": {"code": 3, "message": "PIPELINE_ERROR_DECODE"}}));
        assert_eq!(s.video_verdict().status, CheckStatus::Working);

        let s = state(json!({"hasVideo": true, "readyState": 0, "networkState": 0, "src": "",
            "error": {"code": 3, "message": ""}}));
        let v = s.video_verdict();
        assert_eq!(v.status, CheckStatus::Broken);
        assert_eq!(v.message.as_deref(), Some("Video error: media error code 3"));
    }

    #[test]
    fn non_decode_errors_need_metadata() {
        let err = json!({"code": 4, "message": "MEDIA_ELEMENT_ERROR: Format error"});
        let s = state(json!({"hasVideo": true, "readyState": 1, "error": err.clone()}));
        assert_eq!(s.video_verdict().status, CheckStatus::Working);
        let s = state(json!({"hasVideo": true, "readyState": 0, "src": "https://cdn/x.m3u8", "error": err}));
        assert_eq!(s.video_verdict().status, CheckStatus::Broken);
    }

    #[test]
    fn healthy_video_has_no_message() {
        let v = state(json!({"hasVideo": true, "readyState": 4, "error": null})).video_verdict();
        assert_eq!(v.status, CheckStatus::Working);
        assert!(v.message.is_none());
    }
}
