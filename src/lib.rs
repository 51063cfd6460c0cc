//! Liveness checks for media catalogs.
//!
//! Feeds are normalized into [`types::ContentItem`]s, each item is classified by a
//! heuristic driving a headless browser page ([`classify`]), the [`checker`] runs
//! those checks with bounded concurrency, and [`report`] renders the results.

pub mod browser;
pub mod checker;
pub mod classify;
pub mod config;
pub mod feed;
pub mod html;
pub mod report;
pub mod summary;
pub mod types;

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::browser::{BrowserSettings, ChromiumGateway, Page, PageError, PageGateway};
    pub use crate::checker::{Checker, CheckerOptions};
    pub use crate::classify::{CheckFault, Classifier, ClassifierConfig};
    pub use crate::config::Settings;
    pub use crate::feed::{FeedClient, FeedKind};
    pub use crate::report::{ReportFormat, ReportWriter};
    pub use crate::summary::Summary;
    pub use crate::types::{CheckResult, CheckStatus, ContentItem, ContentType, Verdict};
}
