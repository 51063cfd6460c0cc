//! Content-liveness classification.
//!
//! [`Classifier`] routes a [`ContentItem`] to the heuristic for its type. Each heuristic
//! opens exactly one page, runs under a whole-operation timeout and always closes the
//! page again. Timeouts become `broken` verdicts; other gateway failures surface as a
//! [`CheckFault`] so the orchestrator can retry them.

pub mod channel;
pub mod generic;
pub mod radio;
pub mod scripts;
pub mod signals;
pub mod video;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::time::error::Elapsed;
use tracing::{debug, warn};

use crate::browser::{Page, PageError, PageGateway};
use crate::types::{CheckResult, ContentItem, ContentType, Verdict};

/// Execution fault raised while driving the page, as opposed to a content verdict.
#[derive(Debug, Clone, Error)]
#[error("{context}: {source}")]
pub struct CheckFault {
    pub context: &'static str,
    pub source: PageError,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub radio_timeout: Duration,
    pub video_timeout: Duration,
    pub channel_timeout: Duration,
    pub generic_timeout: Duration,
    /// Wait after DOM construction for third-party players to render.
    pub settle: Duration,
    pub short_settle: Duration,
    /// How long the video classifier looks for a player frame.
    pub frame_wait: Duration,
    /// Hosts of players that draw their own UI without a `<video>` element.
    pub channel_allowlist: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            radio_timeout: Duration::from_secs(25),
            video_timeout: Duration::from_secs(30),
            channel_timeout: Duration::from_secs(35),
            generic_timeout: Duration::from_secs(30),
            settle: Duration::from_secs(5),
            short_settle: Duration::from_secs(2),
            frame_wait: Duration::from_secs(5),
            channel_allowlist: vec!["player2.streamspot.com".to_string()],
        }
    }
}

/// Dispatcher. Cheap to share; safe to call concurrently.
pub struct Classifier {
    gateway: Arc<dyn PageGateway>,
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(gateway: Arc<dyn PageGateway>, config: ClassifierConfig) -> Self { Self { gateway, config } }

    /// Classify `item`, reporting execution faults instead of folding them into the result.
    pub async fn try_classify(&self, item: &ContentItem) -> Result<CheckResult, CheckFault> {
        let Some(url) = item.checkable_url() else {
            return Ok(CheckResult::broken(item, "No URL provided"));
        };
        let gateway = self.gateway.as_ref();
        let config = &self.config;
        let verdict = match &item.kind {
            ContentType::Radio => radio::check_radio(gateway, url, config).await?,
            ContentType::Music | ContentType::Movie => match item.video_id() {
                Some(id) => video::check_video(gateway, id, url, config).await?,
                None => generic::check_generic(gateway, url, config).await?,
            },
            ContentType::Channel => channel::check_channel(gateway, url, item.video_id(), config).await?,
            ContentType::Other(kind) => Verdict::broken(format!("Unknown content type: {}", kind)),
        };
        debug!(name = %item.name, kind = %item.kind, status = %verdict.status, "classified");
        Ok(CheckResult::from_verdict(item, verdict))
    }

    /// Classify `item`; never fails. Faults become `broken` with the fault description.
    pub async fn classify(&self, item: &ContentItem) -> CheckResult {
        match self.try_classify(item).await {
            Ok(result) => result,
            Err(fault) => CheckResult::broken(item, fault.to_string()),
        }
    }
}

pub(crate) async fn open_page(gateway: &dyn PageGateway, context: &'static str) -> Result<Box<dyn Page>, CheckFault> {
    gateway.open_page().await.map_err(|source| CheckFault { context, source })
}

pub(crate) async fn release(page: &dyn Page) {
    if let Err(e) = page.close().await {
        warn!("failed to close page: {}", e);
    }
}

/// Map the outcome of a time-limited probe onto a verdict or fault.
pub(crate) fn conclude(
    outcome: Result<Result<Verdict, PageError>, Elapsed>,
    limit: Duration,
    context: &'static str,
) -> Result<Verdict, CheckFault> {
    match outcome {
        Ok(Ok(verdict)) => Ok(verdict),
        Ok(Err(e)) if e.is_timeout() => Ok(Verdict::timeout(limit.as_secs())),
        Ok(Err(source)) => Err(CheckFault { context, source }),
        Err(_) => Ok(Verdict::timeout(limit.as_secs())),
    }
}

/// Navigate and give asynchronous player initialization time to finish.
pub(crate) async fn load_and_settle(page: &dyn Page, url: &str, settle: Duration) -> Result<(), PageError> {
    page.navigate(url).await?;
    tokio::time::sleep(settle).await;
    Ok(())
}

/// Lowercased visible text of the page.
pub(crate) async fn visible_text(page: &dyn Page) -> Result<String, PageError> {
    Ok(as_text(page.evaluate(scripts::BODY_TEXT).await?).to_lowercase())
}

pub(crate) fn as_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        _ => String::new(),
    }
}

/// Decode a probe result, treating `null` as the type's default.
pub(crate) fn decode<T: DeserializeOwned + Default>(value: Value) -> Result<T, PageError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| PageError::Script(format!("unexpected probe result: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::scripted::{PageScript, ScriptedGateway};
    use crate::types::CheckStatus;
    use serde_json::json;

    fn classifier(script: PageScript) -> (Classifier, Arc<crate::browser::scripted::GatewayStats>) {
        let gw = ScriptedGateway::new(script);
        let stats = gw.stats();
        (Classifier::new(Arc::new(gw), ClassifierConfig::default()), stats)
    }

    #[tokio::test]
    async fn missing_url_is_broken_without_opening_a_page() {
        let (c, stats) = classifier(PageScript::new());
        for kind in ["radio", "music", "movie", "channel", "podcast"] {
            let item = ContentItem::new(ContentType::from(kind), "x", None);
            let r = c.classify(&item).await;
            assert_eq!(r.status, CheckStatus::Broken);
            assert_eq!(r.error_message.as_deref(), Some("No URL provided"));
        }
        assert_eq!(stats.opened(), 0);
    }

    #[tokio::test]
    async fn unknown_type_is_reported() {
        let (c, stats) = classifier(PageScript::new());
        let item = ContentItem::new(ContentType::from("podcast"), "pod", Some("https://x/feed".into()));
        let r = c.classify(&item).await;
        assert_eq!(r.status, CheckStatus::Broken);
        assert!(r.error_message.unwrap().contains("Unknown content type: podcast"));
        assert_eq!(stats.opened(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn identity_fields_come_from_the_item() {
        let script = PageScript::new().respond(scripts::MEDIA_STATE, json!({"hasVideo": true, "readyState": 4}));
        let (c, _) = classifier(script);
        let item = ContentItem::new(ContentType::Movie, "Film", Some("https://cdn.example/embed/1".into()));
        let r = c.classify(&item).await;
        assert_eq!((r.name.as_str(), &r.kind, r.url.as_deref()), ("Film", &ContentType::Movie, item.url.as_deref()));
        assert_eq!(r.status, CheckStatus::Working);
    }

    #[tokio::test(start_paused = true)]
    async fn music_without_video_id_uses_the_generic_probe() {
        let script = PageScript::new()
            .respond(scripts::BODY_TEXT, json!("Video unavailable"))
            .respond(scripts::WATCH_REDIRECT, json!(false));
        let (c, stats) = classifier(script);
        let item = ContentItem::new(ContentType::Music, "Song", Some("https://cdn.example/embed/9".into()));
        let r = c.classify(&item).await;
        assert_eq!(r.status, CheckStatus::Broken);
        assert_eq!(r.error_message.as_deref(), Some("Embed error: unavailable"));

        let item = item.with_video_id(Some("abc".into()));
        let r = c.classify(&item).await;
        assert_eq!(r.error_message.as_deref(), Some("YouTube error: video unavailable"));
        assert_eq!((stats.opened(), stats.closed()), (2, 2));
    }

    #[tokio::test]
    async fn faults_are_folded_into_broken_results() {
        let gw = ScriptedGateway::new(PageScript::new()).failing_opens(1);
        let c = Classifier::new(Arc::new(gw), ClassifierConfig::default());
        let item = ContentItem::new(ContentType::Radio, "r", Some("http://s/stream".into()));
        let r = c.classify(&item).await;
        assert_eq!(r.status, CheckStatus::Broken);
        assert_eq!(
            r.error_message.as_deref(),
            Some("Error checking stream: browser error: scripted open failure")
        );
    }

    #[test]
    fn timeouts_conclude_as_broken_verdicts() {
        let limit = Duration::from_secs(25);
        let v = conclude(Ok(Err(PageError::Timeout(limit))), limit, "ctx").unwrap();
        assert_eq!(v.message.as_deref(), Some("Timeout after 25 seconds"));
        let fault = conclude(Ok(Err(PageError::Navigation("dns".into()))), limit, "ctx").unwrap_err();
        assert_eq!(fault.to_string(), "ctx: navigation failed: dns");
    }
}
