use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub no_sandbox: bool,
    /// CDP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self { headless: true, executable: None, no_sandbox: false, request_timeout_secs: 60 }
    }
}
