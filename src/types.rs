use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Declared kind of a catalog entry. Unrecognized kinds survive as `Other` so the
/// dispatcher can report them instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    Radio,
    Music,
    Movie,
    Channel,
    Other(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Radio => "radio",
            ContentType::Music => "music",
            ContentType::Movie => "movie",
            ContentType::Channel => "channel",
            ContentType::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for ContentType {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "radio" => ContentType::Radio,
            "music" => ContentType::Music,
            "movie" | "movies" => ContentType::Movie,
            "channel" | "channels" => ContentType::Channel,
            _ => ContentType::Other(s),
        }
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self { ContentType::from(s.to_string()) }
}

impl From<ContentType> for String {
    fn from(t: ContentType) -> Self { t.as_str().to_string() }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

fn unknown_name() -> String { "Unknown".to_string() }

/// One catalog entry as produced by feed normalization. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: ContentType,
    #[serde(default = "unknown_name")]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl ContentItem {
    pub fn new(kind: ContentType, name: impl Into<String>, url: Option<String>) -> Self {
        Self { kind, name: name.into(), url, video_id: None, source_file: None }
    }

    pub fn with_video_id(mut self, video_id: Option<String>) -> Self {
        self.video_id = video_id;
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// The URL to check, treating blank strings as absent.
    pub fn checkable_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Video id, treating blank strings as absent.
    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Working,
    Broken,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Working => "working",
            CheckStatus::Broken => "broken",
        }
    }

    pub fn is_working(self) -> bool { matches!(self, CheckStatus::Working) }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// What a classifier concluded. Identity fields are added by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: CheckStatus,
    pub message: Option<String>,
    pub checked_at: Option<DateTime<Local>>,
}

impl Verdict {
    pub fn working() -> Self {
        Self { status: CheckStatus::Working, message: None, checked_at: None }
    }

    /// Working, with an informational note.
    pub fn working_with(note: impl Into<String>) -> Self {
        Self { status: CheckStatus::Working, message: Some(note.into()), checked_at: None }
    }

    pub fn broken(message: impl Into<String>) -> Self {
        Self { status: CheckStatus::Broken, message: Some(message.into()), checked_at: None }
    }

    pub fn timeout(secs: u64) -> Self { Self::broken(format!("Timeout after {} seconds", secs)) }
}

/// Flat, serializable outcome of checking one ContentItem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub url: Option<String>,
    pub status: CheckStatus,
    pub error_message: Option<String>,
    pub check_time: DateTime<Local>,
}

impl CheckResult {
    /// Attach identity fields from `item` to `verdict`, stamping the time if unset.
    pub fn from_verdict(item: &ContentItem, verdict: Verdict) -> Self {
        Self {
            name: item.name.clone(),
            kind: item.kind.clone(),
            url: item.url.clone(),
            status: verdict.status,
            error_message: verdict.message,
            check_time: verdict.checked_at.unwrap_or_else(Local::now),
        }
    }

    pub fn broken(item: &ContentItem, message: impl Into<String>) -> Self {
        Self::from_verdict(item, Verdict::broken(message))
    }

    pub fn is_working(&self) -> bool { self.status.is_working() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_round_trips_known_and_unknown_names() {
        assert_eq!(ContentType::from("Radio"), ContentType::Radio);
        assert_eq!(ContentType::from("movies"), ContentType::Movie);
        assert_eq!(ContentType::from("podcast"), ContentType::Other("podcast".into()));
        assert_eq!(String::from(ContentType::Other("podcast".into())), "podcast");
    }

    #[test]
    fn item_defaults_name_and_accepts_missing_url() {
        let item: ContentItem = serde_json::from_str(r#"{"type":"channel"}"#).unwrap();
        assert_eq!(item.name, "Unknown");
        assert_eq!(item.kind, ContentType::Channel);
        assert!(item.checkable_url().is_none());
    }

    #[test]
    fn blank_url_is_not_checkable() {
        let item = ContentItem::new(ContentType::Radio, "x", Some("   ".into()));
        assert!(item.checkable_url().is_none());
    }

    #[test]
    fn result_serializes_exactly_the_flat_fields() {
        let item = ContentItem::new(ContentType::Music, "song", Some("https://a/b".into()));
        let result = CheckResult::from_verdict(&item, Verdict::broken("gone"));
        let value = serde_json::to_value(&result).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["check_time", "error_message", "name", "status", "type", "url"]);
        assert_eq!(obj["status"], "broken");
        assert_eq!(obj["type"], "music");
    }

    #[test]
    fn classifier_time_is_kept_when_set() {
        let item = ContentItem::new(ContentType::Radio, "r", Some("u".into()));
        let at = Local::now() - chrono::Duration::seconds(30);
        let verdict = Verdict { checked_at: Some(at), ..Verdict::working() };
        assert_eq!(CheckResult::from_verdict(&item, verdict).check_time, at);
    }
}
