//! Bounded-concurrency checking of a whole catalog.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::classify::{CheckFault, Classifier};
use crate::types::{CheckResult, ContentItem};

#[derive(Debug, Clone)]
pub struct CheckerOptions {
    /// Upper bound on checks with an open page at any moment.
    pub max_concurrent: usize,
    /// Extra attempts after an execution fault.
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub slow_warn: Duration,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            max_retries: 1,
            retry_delay: Duration::from_secs(2),
            slow_warn: Duration::from_secs(20),
        }
    }
}

pub struct Checker {
    classifier: Classifier,
    options: CheckerOptions,
}

impl Checker {
    pub fn new(classifier: Classifier, options: CheckerOptions) -> Self { Self { classifier, options } }

    /// Check every item. Returns one result per item, in input order.
    pub async fn check_all(&self, items: &[ContentItem]) -> Vec<CheckResult> {
        let total = items.len();
        let permits = Semaphore::new(self.options.max_concurrent.max(1));
        let done = AtomicUsize::new(0);
        info!("checking {} items, {} at a time", total, self.options.max_concurrent.max(1));

        let checks = items.iter().map(|item| {
            let permits = &permits;
            let done = &done;
            async move {
                // The semaphore is never closed.
                let _permit = permits.acquire().await.ok();
                let result = self.check_one(item).await;
                let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                match &result.error_message {
                    Some(msg) => info!("[{}/{}] {} ({}): {} - {}", n, total, item.name, item.kind, result.status, msg),
                    None => info!("[{}/{}] {} ({}): {}", n, total, item.name, item.kind, result.status),
                }
                result
            }
        });
        join_all(checks).await
    }

    /// Check a single item, retrying execution faults. Never fails.
    pub async fn check_one(&self, item: &ContentItem) -> CheckResult {
        let start = Instant::now();
        let result = match self.retry(item).await {
            Ok(result) => result,
            Err(fault) => CheckResult::broken(item, format!("Exception during check: {}", fault)),
        };
        self.warn_if_slow(start, item);
        result
    }

    async fn retry(&self, item: &ContentItem) -> Result<CheckResult, CheckFault> {
        let mut attempt = 0;
        loop {
            match self.classifier.try_classify(item).await {
                Ok(result) => return Ok(result),
                Err(fault) if attempt < self.options.max_retries => {
                    attempt += 1;
                    warn!("check of {} failed: {}. Retrying...", item.name, fault);
                    tokio::time::sleep(self.options.retry_delay).await;
                }
                Err(fault) => return Err(fault),
            }
        }
    }

    fn warn_if_slow(&self, start: Instant, item: &ContentItem) {
        let elapsed = start.elapsed();
        if elapsed > self.options.slow_warn {
            warn!("check of {} ({}) took {:?}", item.name, item.kind, elapsed);
        }
    }
}
