//! Permissive shape normalization of feed documents.
//!
//! Feeds have changed layout several times: a bare list, a list under a named key,
//! or items nested under arbitrary categories. All of them end up as a flat list.

use serde_json::{Map, Value};
use tracing::warn;
use url::Url;

use super::FeedKind;
use crate::types::ContentItem;

impl FeedKind {
    /// Key of the string field holding the item's URL.
    fn url_key(self) -> &'static str {
        match self {
            FeedKind::Radio => "src",
            _ => "embed",
        }
    }

    /// Keys that may hold the item list at the top of the document.
    fn list_keys(self) -> &'static [&'static str] {
        match self {
            FeedKind::Radio => &["radio", "stations"],
            FeedKind::Music => &["music"],
            FeedKind::Movies => &["movies"],
            FeedKind::Channels => &["channels", "items", "data", "stations"],
        }
    }
}

pub fn normalize(kind: FeedKind, doc: &Value) -> Vec<ContentItem> {
    let raw: Vec<&Value> = match doc {
        Value::Array(list) => list.iter().collect(),
        Value::Object(map) => match kind.list_keys().iter().find_map(|k| map.get(*k).and_then(Value::as_array)) {
            Some(list) => list.iter().collect(),
            // Channels feeds without a list are a single item.
            None if kind == FeedKind::Channels => vec![doc],
            None => {
                let mut found = Vec::new();
                collect_with_key(doc, kind.url_key(), &mut found);
                found
            }
        },
        other => {
            warn!("unexpected data structure in {}: {}", kind.file_name(), type_name(other));
            return Vec::new();
        }
    };
    raw.into_iter().filter_map(Value::as_object).filter_map(|obj| item_from(kind, obj)).collect()
}

fn collect_with_key<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(list) => list.iter().for_each(|v| collect_with_key(v, key, out)),
        Value::Object(map) => {
            if map.get(key).is_some_and(Value::is_string) {
                out.push(value);
            }
            map.values().for_each(|v| collect_with_key(v, key, out));
        }
        _ => {}
    }
}

fn item_from(kind: FeedKind, obj: &Map<String, Value>) -> Option<ContentItem> {
    let url = non_empty(obj, kind.url_key())?;
    let name = non_empty(obj, "name").or_else(|| non_empty(obj, "title")).unwrap_or("Unknown");
    let video_id = match kind {
        FeedKind::Radio => None,
        _ => extract_video_id(url),
    };
    Some(
        ContentItem::new(kind.content_type(), name, Some(url.to_string()))
            .with_video_id(video_id)
            .with_source_file(kind.file_name()),
    )
}

fn non_empty<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Video id of a YouTube embed, short-link or watch URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    const PATH_MARKERS: &[&str] = &["youtube.com/embed/", "youtube-nocookie.com/embed/", "youtu.be/"];
    for marker in PATH_MARKERS {
        if let Some((_, rest)) = url.split_once(marker) {
            let id = rest.split(['?', '&', '#', '/']).next().unwrap_or_default();
            return (!id.is_empty()).then(|| id.to_string());
        }
    }
    if url.contains("youtube.com/watch") {
        let parsed = Url::parse(url).ok()?;
        return parsed.query_pairs().find(|(k, _)| k == "v").map(|(_, v)| v.into_owned()).filter(|v| !v.is_empty());
    }
    None
}
