use std::sync::Arc;
use std::time::Duration;

use mediacheck::browser::scripted::{PageScript, ScriptedGateway};
use mediacheck::classify::scripts;
use mediacheck::prelude::*;
use serde_json::json;

fn classifier(script: PageScript) -> (Classifier, Arc<mediacheck::browser::scripted::GatewayStats>) {
    let gw = ScriptedGateway::new(script);
    let stats = gw.stats();
    (Classifier::new(Arc::new(gw), ClassifierConfig::default()), stats)
}

fn item(kind: &str, url: &str) -> ContentItem { ContentItem::new(ContentType::from(kind), "item", Some(url.to_string())) }

#[tokio::test(start_paused = true)]
async fn radio_is_loaded_into_an_audio_page_without_navigation() {
    let script = PageScript::new()
        .condition(true, Duration::from_millis(500))
        .respond(scripts::RADIO_STATE, json!({"canPlay": true, "readyState": 3}));
    let (c, stats) = classifier(script);
    let r = c.classify(&item("radio", "http://radio.example/stream")).await;
    assert_eq!(r.status, CheckStatus::Working);
    assert!(stats.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn channel_on_the_allowlist_is_working_without_a_player() {
    let (c, stats) = classifier(PageScript::new().respond(scripts::BODY_TEXT, json!("Sunday service")));
    let r = c.classify(&item("channel", "https://player2.streamspot.com/?playerId=42")).await;
    assert_eq!(r.status, CheckStatus::Working);
    assert_eq!(r.error_message, None);
    assert_eq!(stats.navigations(), vec!["https://player2.streamspot.com/?playerId=42".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn movie_with_video_id_uses_the_platform_heuristic() {
    let script = PageScript::new()
        .respond(scripts::BODY_TEXT, json!("Private video"))
        .respond(scripts::WATCH_REDIRECT, json!(false));
    let (c, _) = classifier(script);
    let movie = item("movie", "https://www.youtube.com/embed/m1").with_video_id(Some("m1".into()));
    let r = c.classify(&movie).await;
    assert_eq!(r.status, CheckStatus::Broken);
    assert!(r.error_message.unwrap().contains("private video"));
}

#[tokio::test(start_paused = true)]
async fn every_result_has_the_same_flat_shape() {
    let (c, _) = classifier(PageScript::new());
    let items = [
        item("radio", "http://r"),
        item("music", "https://m"),
        item("movie", "https://v"),
        item("channel", "https://c"),
        item("podcast", "https://p"),
        ContentItem::new(ContentType::Radio, "empty", Some("  ".into())),
    ];
    for it in &items {
        let value = serde_json::to_value(c.classify(it).await).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["check_time", "error_message", "name", "status", "type", "url"]);
        assert!(matches!(value["status"].as_str(), Some("working") | Some("broken")));
    }
}

#[tokio::test(start_paused = true)]
async fn hung_pages_time_out_and_are_closed() {
    let config = ClassifierConfig { channel_timeout: Duration::from_secs(7), ..ClassifierConfig::default() };
    let gw = ScriptedGateway::new(PageScript::new().delay_evaluations(Duration::from_secs(600)));
    let stats = gw.stats();
    let c = Classifier::new(Arc::new(gw), config);
    let r = c.classify(&item("channel", "https://tv.example/embed")).await;
    assert_eq!(r.error_message.as_deref(), Some("Timeout after 7 seconds"));
    assert_eq!((stats.opened(), stats.closed()), (1, 1));
}
