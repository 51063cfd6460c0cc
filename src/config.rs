//! Layered settings: built-in defaults, then a TOML file, then `MEDIACHECK_*`
//! environment variables. CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::browser::BrowserSettings;
use crate::checker::CheckerOptions;
use crate::classify::ClassifierConfig;
use crate::feed::FeedSettings;

const ENV_PREFIX: &str = "MEDIACHECK_";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub default_secs: u64,
    pub radio_secs: u64,
    pub video_secs: u64,
    pub channel_secs: u64,
    pub settle_secs: u64,
    pub short_settle_secs: u64,
    pub frame_wait_secs: u64,
    pub slow_warn_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default_secs: 30,
            radio_secs: 25,
            video_secs: 30,
            channel_secs: 35,
            settle_secs: 5,
            short_settle_secs: 2,
            frame_wait_secs: 5,
            slow_warn_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Checks {
    pub max_concurrent: usize,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub channel_allowlist: Vec<String>,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            max_retries: 1,
            retry_delay_secs: 2,
            channel_allowlist: vec!["player2.streamspot.com".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Reports {
    pub dir: PathBuf,
}

impl Default for Reports {
    fn default() -> Self { Self { dir: PathBuf::from("reports") } }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feeds: FeedSettings,
    pub timeouts: Timeouts,
    pub checks: Checks,
    pub browser: BrowserSettings,
    pub reports: Reports,
}

impl Settings {
    /// Load settings. An explicit `path` must exist; otherwise `config.toml` in the
    /// platform config directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let settings = Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))?;
        debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self> { Ok(toml::from_str(text)?) }

    /// Apply `MEDIACHECK_*` overrides read through `lookup`. Unparsable values are
    /// ignored with a warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BASE_URL") { self.feeds.base_url = v; }
        if let Some(v) = get("REPORTS_DIR") { self.reports.dir = PathBuf::from(v); }
        if let Some(v) = get("CHROME") { self.browser.executable = Some(PathBuf::from(v)); }
        if let Some(v) = get("CHANNEL_ALLOWLIST") {
            self.checks.channel_allowlist = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        parse_into(&get, "FETCH_TIMEOUT_SECS", &mut self.feeds.fetch_timeout_secs);
        parse_into(&get, "DEFAULT_TIMEOUT_SECS", &mut self.timeouts.default_secs);
        parse_into(&get, "RADIO_TIMEOUT_SECS", &mut self.timeouts.radio_secs);
        parse_into(&get, "VIDEO_TIMEOUT_SECS", &mut self.timeouts.video_secs);
        parse_into(&get, "CHANNEL_TIMEOUT_SECS", &mut self.timeouts.channel_secs);
        parse_into(&get, "SETTLE_SECS", &mut self.timeouts.settle_secs);
        parse_into(&get, "SHORT_SETTLE_SECS", &mut self.timeouts.short_settle_secs);
        parse_into(&get, "FRAME_WAIT_SECS", &mut self.timeouts.frame_wait_secs);
        parse_into(&get, "SLOW_WARN_SECS", &mut self.timeouts.slow_warn_secs);
        parse_into(&get, "MAX_CONCURRENT", &mut self.checks.max_concurrent);
        parse_into(&get, "MAX_RETRIES", &mut self.checks.max_retries);
        parse_into(&get, "RETRY_DELAY_SECS", &mut self.checks.retry_delay_secs);
        parse_into(&get, "HEADLESS", &mut self.browser.headless);
        parse_into(&get, "NO_SANDBOX", &mut self.browser.no_sandbox);
        parse_into(&get, "REQUEST_TIMEOUT_SECS", &mut self.browser.request_timeout_secs);
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        let t = &self.timeouts;
        ClassifierConfig {
            radio_timeout: secs(t.radio_secs),
            video_timeout: secs(t.video_secs),
            channel_timeout: secs(t.channel_secs),
            generic_timeout: secs(t.default_secs),
            settle: Duration::from_secs(t.settle_secs),
            short_settle: Duration::from_secs(t.short_settle_secs),
            frame_wait: secs(t.frame_wait_secs),
            channel_allowlist: self.checks.channel_allowlist.clone(),
        }
    }

    pub fn checker_options(&self) -> CheckerOptions {
        CheckerOptions {
            max_concurrent: self.checks.max_concurrent.max(1),
            max_retries: self.checks.max_retries,
            retry_delay: Duration::from_secs(self.checks.retry_delay_secs),
            slow_warn: Duration::from_secs(self.timeouts.slow_warn_secs),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "mediacheck", "mediacheck").map(|p| p.config_dir().join("config.toml"))
}

/// Timeouts of zero would fail every check instantly.
fn secs(n: u64) -> Duration { Duration::from_secs(n.max(1)) }

fn parse_into<T: std::str::FromStr>(get: &impl Fn(&str) -> Option<String>, name: &str, slot: &mut T) {
    if let Some(raw) = get(name) {
        match raw.trim().parse() {
            Ok(v) => *slot = v,
            Err(_) => warn!("ignoring {}{}={:?}: not a valid value", ENV_PREFIX, name, raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.feeds.base_url, "https://www.eternityready.com/data");
        let c = s.classifier_config();
        assert_eq!(c.radio_timeout, Duration::from_secs(25));
        assert_eq!(c.channel_timeout, Duration::from_secs(35));
        assert_eq!(c.generic_timeout, Duration::from_secs(30));
        assert_eq!(c.channel_allowlist, vec!["player2.streamspot.com".to_string()]);
        let o = s.checker_options();
        assert_eq!((o.max_concurrent, o.max_retries), (3, 1));
        assert_eq!(s.reports.dir, PathBuf::from("reports"));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let s = Settings::from_toml(
            "[timeouts]\nradio_secs = 12\n\n[checks]\nmax_concurrent = 8\n\n[feeds.files]\nradio = \"http://mirror/radio.json\"\n",
        )
        .unwrap();
        assert_eq!(s.timeouts.radio_secs, 12);
        assert_eq!(s.timeouts.video_secs, 30);
        assert_eq!(s.checks.max_concurrent, 8);
        assert_eq!(s.checks.max_retries, 1);
        assert_eq!(s.feeds.files.get("radio").map(String::as_str), Some("http://mirror/radio.json"));
        assert!(Settings::from_toml("[checks]\nmax_concurrent = \"many\"").is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("MEDIACHECK_MAX_CONCURRENT", "5"),
            ("MEDIACHECK_HEADLESS", "false"),
            ("MEDIACHECK_RADIO_TIMEOUT_SECS", "soon"),
            ("MEDIACHECK_CHANNEL_ALLOWLIST", "a.example, b.example"),
        ]
        .into_iter()
        .collect();
        let mut s = Settings::from_toml("[checks]\nmax_concurrent = 8").unwrap();
        s.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(s.checks.max_concurrent, 5);
        assert!(!s.browser.headless);
        assert_eq!(s.timeouts.radio_secs, 25);
        assert_eq!(s.checks.channel_allowlist, vec!["a.example".to_string(), "b.example".to_string()]);
    }

    #[test]
    fn every_wait_has_an_environment_override() {
        let env: HashMap<&str, &str> = [
            ("MEDIACHECK_SHORT_SETTLE_SECS", "4"),
            ("MEDIACHECK_FRAME_WAIT_SECS", "9"),
            ("MEDIACHECK_REQUEST_TIMEOUT_SECS", "90"),
        ]
        .into_iter()
        .collect();
        let mut s = Settings::default();
        s.apply_env(|k| env.get(k).map(|v| v.to_string()));
        let c = s.classifier_config();
        assert_eq!(c.short_settle, Duration::from_secs(4));
        assert_eq!(c.frame_wait, Duration::from_secs(9));
        assert_eq!(s.browser.request_timeout_secs, 90);
    }

    #[test]
    fn explicit_file_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&tmp.path().join("missing.toml"))).is_err());
        let path = tmp.path().join("mediacheck.toml");
        std::fs::write(&path, "[reports]\ndir = \"out\"\n").unwrap();
        assert_eq!(Settings::from_file(&path).unwrap().reports.dir, PathBuf::from("out"));
    }
}
