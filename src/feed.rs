//! Catalog feeds: download the JSON files and turn them into [`ContentItem`]s.

pub mod normalize;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::types::{ContentItem, ContentType};

pub use normalize::{extract_video_id, normalize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeedKind {
    Channels,
    Music,
    Radio,
    Movies,
}

impl FeedKind {
    pub const ALL: [FeedKind; 4] = [FeedKind::Channels, FeedKind::Music, FeedKind::Radio, FeedKind::Movies];

    pub fn name(self) -> &'static str {
        match self {
            FeedKind::Channels => "channels",
            FeedKind::Music => "music",
            FeedKind::Radio => "radio",
            FeedKind::Movies => "movies",
        }
    }

    pub fn file_name(self) -> String { format!("{}.json", self.name()) }

    pub fn content_type(self) -> ContentType {
        match self {
            FeedKind::Channels => ContentType::Channel,
            FeedKind::Music => ContentType::Music,
            FeedKind::Radio => ContentType::Radio,
            FeedKind::Movies => ContentType::Movie,
        }
    }

    /// Parse a comma-separated list such as `channels,music`, or `all`.
    pub fn parse_list(list: &str) -> Result<Vec<FeedKind>> {
        let mut kinds = Vec::new();
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part.eq_ignore_ascii_case("all") {
                return Ok(FeedKind::ALL.to_vec());
            }
            let kind: FeedKind = part.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            bail!("no feed files given");
        }
        Ok(kinds)
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for FeedKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().trim_end_matches(".json");
        FeedKind::ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(wanted)).ok_or_else(|| {
            let valid: Vec<_> = FeedKind::ALL.iter().map(|k| k.name()).collect();
            anyhow!("invalid file type '{}'; valid types: {}", s, valid.join(", "))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub base_url: String,
    /// Per-kind URL overrides, keyed by kind name.
    pub files: BTreeMap<String, String>,
    pub fetch_timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self { base_url: "https://www.eternityready.com/data".to_string(), files: BTreeMap::new(), fetch_timeout_secs: 10 }
    }
}

impl FeedSettings {
    pub fn url_for(&self, kind: FeedKind) -> String {
        match self.files.get(kind.name()) {
            Some(url) => url.clone(),
            None => format!("{}/{}", self.base_url.trim_end_matches('/'), kind.file_name()),
        }
    }
}

pub struct FeedClient {
    client: reqwest::Client,
    settings: FeedSettings,
}

impl FeedClient {
    pub fn new(settings: FeedSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mediacheck/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.fetch_timeout_secs.max(1)))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, settings })
    }

    pub async fn fetch_json(&self, kind: FeedKind) -> Result<serde_json::Value> {
        let url = self.settings.url_for(kind);
        let resp = self.client.get(&url).send().await.with_context(|| format!("error fetching {}", url))?;
        let resp = resp.error_for_status().with_context(|| format!("error fetching {}", url))?;
        resp.json().await.with_context(|| format!("error parsing JSON from {}", url))
    }

    pub async fn fetch(&self, kind: FeedKind) -> Result<Vec<ContentItem>> {
        let doc = self.fetch_json(kind).await?;
        Ok(normalize(kind, &doc))
    }

    /// Fetch every kind in turn. A feed that cannot be loaded contributes no items.
    pub async fn fetch_all(&self, kinds: &[FeedKind]) -> Vec<ContentItem> {
        let mut all = Vec::new();
        for &kind in kinds {
            match self.fetch(kind).await {
                Ok(items) => {
                    info!("{}: found {} items", kind.file_name(), items.len());
                    all.extend(items);
                }
                Err(e) => warn!("{}: {:#}", kind.file_name(), e),
            }
        }
        all
    }
}
