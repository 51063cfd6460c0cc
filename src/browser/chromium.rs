use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{BrowserSettings, Page, PageError, PageGateway};

// `about:blank` also reports readyState "complete", so require the new location too
const DOM_READY: &str = "location.href !== 'about:blank' && document.readyState !== 'loading'";

/// Headless Chromium driven over CDP. One browser process, one tab per check.
pub struct ChromiumGateway {
    browser: Browser,
    handler: JoinHandle<()>,
    request_timeout: Duration,
}

impl ChromiumGateway {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let request_timeout = Duration::from_secs(settings.request_timeout_secs.max(1));
        let mut builder = BrowserConfig::builder().request_timeout(request_timeout);
        if !settings.headless { builder = builder.with_head(); }
        if settings.no_sandbox { builder = builder.no_sandbox(); }
        if let Some(path) = &settings.executable { builder = builder.chrome_executable(path); }
        let config = builder.build().map_err(|e| anyhow!("invalid browser configuration: {}", e))?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .context("failed to launch chromium (is Chrome/Chromium installed?)")?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!("cdp handler: {}", e);
                }
            }
        });
        debug!("chromium launched");
        Ok(Self { browser, handler, request_timeout })
    }

    pub async fn shutdown(mut self) -> Result<()> {
        let closed = self.browser.close().await.map(|_| ()).context("failed to close chromium");
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.handler.abort();
        closed
    }
}

#[async_trait]
impl PageGateway for ChromiumGateway {
    async fn open_page(&self) -> Result<Box<dyn Page>, PageError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| cdp_error(e, self.request_timeout, PageError::Browser))?;
        Ok(Box::new(ChromiumPage { page, request_timeout: self.request_timeout }))
    }
}

struct ChromiumPage {
    page: chromiumoxide::Page,
    request_timeout: Duration,
}

#[async_trait]
impl Page for ChromiumPage {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| cdp_error(e, self.request_timeout, PageError::Navigation))?;
        if let Some(reason) = response.result.error_text.as_deref().filter(|t| !t.is_empty()) {
            return Err(PageError::Navigation(format!("{}: {}", url, reason)));
        }
        self.wait_for_condition(DOM_READY, self.request_timeout).await
    }

    async fn set_content(&self, html: &str) -> Result<(), PageError> {
        self.page
            .set_content(html)
            .await
            .map(|_| ())
            .map_err(|e| cdp_error(e, self.request_timeout, PageError::Browser))
    }

    async fn evaluate(&self, script: &str) -> Result<Value, PageError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| cdp_error(e, self.request_timeout, PageError::Script))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn close(&self) -> Result<(), PageError> {
        self.page.clone().close().await.map_err(|e| cdp_error(e, self.request_timeout, PageError::Browser))
    }
}

fn cdp_error(err: CdpError, timeout: Duration, kind: fn(String) -> PageError) -> PageError {
    match err {
        CdpError::Timeout => PageError::Timeout(timeout),
        other => kind(other.to_string()),
    }
}
