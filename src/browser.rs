//! Page automation gateway.
//!
//! Classifiers never touch a browser directly; they drive a [`Page`] obtained from a
//! [`PageGateway`]. The chromium implementation lives in [`chromium`], an in-memory
//! scripted one in [`scripted`].

pub mod chromium;
pub mod config;
pub mod scripted;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub use chromium::ChromiumGateway;
pub use config::BrowserSettings;

/// Interval between predicate evaluations while waiting on a condition.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PageError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("script evaluation failed: {0}")]
    Script(String),
    #[error("browser error: {0}")]
    Browser(String),
    #[error("page already closed")]
    Closed,
}

impl PageError {
    pub fn is_timeout(&self) -> bool { matches!(self, PageError::Timeout(_)) }
}

/// One browser tab, owned by a single check for its whole lifetime.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate and return once the DOM has been constructed.
    async fn navigate(&self, url: &str) -> Result<(), PageError>;

    /// Replace the document with `html`.
    async fn set_content(&self, html: &str) -> Result<(), PageError>;

    /// Evaluate a JS expression and return its JSON-serialized value (`Null` for undefined).
    async fn evaluate(&self, script: &str) -> Result<Value, PageError>;

    async fn close(&self) -> Result<(), PageError>;

    /// Poll `predicate` until it is truthy or `timeout` elapses.
    ///
    /// Script failures count as "not yet": the execution context is briefly missing
    /// while a navigation commits. Closed pages and browser errors end the wait.
    async fn wait_for_condition(&self, predicate: &str, timeout: Duration) -> Result<(), PageError> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut last_error = None;
        loop {
            match self.evaluate(predicate).await {
                Ok(value) if is_truthy(&value) => return Ok(()),
                Ok(_) => {}
                Err(PageError::Script(msg)) => last_error = Some(msg),
                Err(e) => return Err(e),
            }
            if tokio::time::Instant::now() >= deadline {
                if let Some(msg) = last_error {
                    debug!("condition not met within {:?}, last evaluation error: {}", timeout, msg);
                }
                return Err(PageError::Timeout(timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        self.wait_for_condition(&selector_predicate(selector), timeout).await
    }
}

/// Opens fresh pages. Implementations must be safe to share across concurrent checks.
#[async_trait]
pub trait PageGateway: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn Page>, PageError>;
}

/// JS truthiness for values that came back through JSON.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Expression that is true once `selector` matches an element.
pub fn selector_predicate(selector: &str) -> String {
    // serde_json quoting doubles as JS string-literal escaping
    let quoted = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string());
    format!("document.querySelector({}) !== null", quoted)
}
