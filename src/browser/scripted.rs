//! In-memory gateway that answers probe scripts from a fixed script table.
//!
//! Useful for dry runs and tests: no browser process, deterministic verdicts, and
//! counters for how many pages were opened, closed and open at the same time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{Page, PageError, PageGateway};

/// What every page opened from a [`ScriptedGateway`] will answer.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    responses: HashMap<String, Vec<Value>>,
    navigate_error: Option<PageError>,
    condition_met: bool,
    condition_delay: Duration,
    evaluation_delay: Duration,
    selectors: Vec<String>,
}

impl PageScript {
    pub fn new() -> Self { Self::default() }

    /// Answer `script` with `value`. Repeated calls queue answers for successive
    /// evaluations; the last answer repeats once the queue is exhausted.
    pub fn respond(mut self, script: &str, value: Value) -> Self {
        self.responses.entry(script.to_string()).or_default().push(value);
        self
    }

    pub fn fail_navigation(mut self, err: PageError) -> Self {
        self.navigate_error = Some(err);
        self
    }

    /// `wait_for_condition` resolves after `delay`, succeeding only if `met`.
    pub fn condition(mut self, met: bool, delay: Duration) -> Self {
        self.condition_met = met;
        self.condition_delay = delay;
        self
    }

    /// Every evaluation takes `delay` before answering.
    pub fn delay_evaluations(mut self, delay: Duration) -> Self {
        self.evaluation_delay = delay;
        self
    }

    /// `wait_for_selector(selector)` succeeds immediately.
    pub fn selector(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }
}

#[derive(Debug, Default)]
pub struct GatewayStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    open_now: AtomicUsize,
    max_open: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

impl GatewayStats {
    pub fn opened(&self) -> usize { self.opened.load(Ordering::SeqCst) }
    pub fn closed(&self) -> usize { self.closed.load(Ordering::SeqCst) }
    pub fn max_open(&self) -> usize { self.max_open.load(Ordering::SeqCst) }
    pub fn navigations(&self) -> Vec<String> { lock(&self.navigations).clone() }
}

pub struct ScriptedGateway {
    script: PageScript,
    stats: Arc<GatewayStats>,
    open_failures: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(script: PageScript) -> Self {
        Self { script, stats: Arc::new(GatewayStats::default()), open_failures: AtomicUsize::new(0) }
    }

    /// The first `n` calls to `open_page` fail with a browser error.
    pub fn failing_opens(self, n: usize) -> Self {
        self.open_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn stats(&self) -> Arc<GatewayStats> { self.stats.clone() }
}

#[async_trait]
impl PageGateway for ScriptedGateway {
    async fn open_page(&self) -> Result<Box<dyn Page>, PageError> {
        let failed = self
            .open_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(PageError::Browser("scripted open failure".to_string()));
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        let now = self.stats.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_open.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(ScriptedPage {
            script: self.script.clone(),
            stats: self.stats.clone(),
            served: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }))
    }
}

struct ScriptedPage {
    script: PageScript,
    stats: Arc<GatewayStats>,
    served: Mutex<HashMap<String, usize>>,
    closed: AtomicBool,
}

impl ScriptedPage {
    fn ensure_open(&self) -> Result<(), PageError> {
        if self.closed.load(Ordering::SeqCst) { Err(PageError::Closed) } else { Ok(()) }
    }
}

#[async_trait]
impl Page for ScriptedPage {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.ensure_open()?;
        lock(&self.stats.navigations).push(url.to_string());
        match &self.script.navigate_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn set_content(&self, _html: &str) -> Result<(), PageError> { self.ensure_open() }

    async fn evaluate(&self, script: &str) -> Result<Value, PageError> {
        self.ensure_open()?;
        if !self.script.evaluation_delay.is_zero() {
            tokio::time::sleep(self.script.evaluation_delay).await;
        }
        let Some(answers) = self.script.responses.get(script) else { return Ok(Value::Null) };
        let mut served = lock(&self.served);
        let n = served.entry(script.to_string()).or_insert(0);
        let value = answers.get(*n).or_else(|| answers.last()).cloned().unwrap_or(Value::Null);
        *n += 1;
        Ok(value)
    }

    async fn close(&self) -> Result<(), PageError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.stats.closed.fetch_add(1, Ordering::SeqCst);
            self.stats.open_now.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn wait_for_condition(&self, _predicate: &str, timeout: Duration) -> Result<(), PageError> {
        self.ensure_open()?;
        let delay = self.script.condition_delay;
        if self.script.condition_met && delay <= timeout {
            tokio::time::sleep(delay).await;
            Ok(())
        } else {
            tokio::time::sleep(timeout).await;
            Err(PageError::Timeout(timeout))
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        self.ensure_open()?;
        if self.script.selectors.iter().any(|s| s == selector) {
            Ok(())
        } else {
            tokio::time::sleep(timeout).await;
            Err(PageError::Timeout(timeout))
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn answers_queue_then_repeat_last() {
        let gw = ScriptedGateway::new(PageScript::new().respond("x", json!(1)).respond("x", json!(2)));
        let page = gw.open_page().await.unwrap();
        assert_eq!(page.evaluate("x").await.unwrap(), json!(1));
        assert_eq!(page.evaluate("x").await.unwrap(), json!(2));
        assert_eq!(page.evaluate("x").await.unwrap(), json!(2));
        assert_eq!(page.evaluate("unknown").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn tracks_open_and_close_counts() {
        let gw = ScriptedGateway::new(PageScript::new()).failing_opens(1);
        assert!(gw.open_page().await.is_err());
        let a = gw.open_page().await.unwrap();
        let b = gw.open_page().await.unwrap();
        a.close().await.unwrap();
        a.close().await.unwrap();
        b.close().await.unwrap();
        let stats = gw.stats();
        assert_eq!((stats.opened(), stats.closed(), stats.max_open()), (2, 2, 2));
        assert_eq!(a.evaluate("x").await, Err(PageError::Closed));
    }
}
