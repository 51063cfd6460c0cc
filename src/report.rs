//! Report writers. Each run writes one file per requested format, all sharing the
//! run's timestamp in their file name.

pub mod csv;
pub mod html;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::summary::Summary;
use crate::types::CheckResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Csv,
    Json,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Html, ReportFormat::Csv, ReportFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }

    /// `html`, `csv`, `json`, a comma-separated mix, or `all`.
    pub fn parse_list(list: &str) -> Result<Vec<ReportFormat>> {
        let mut formats = Vec::new();
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part.eq_ignore_ascii_case("all") {
                return Ok(ReportFormat::ALL.to_vec());
            }
            let f: ReportFormat = part.parse()?;
            if !formats.contains(&f) {
                formats.push(f);
            }
        }
        if formats.is_empty() {
            bail!("no output format given");
        }
        Ok(formats)
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.extension()) }
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => bail!("unknown output format '{}' (expected html, csv, json or all)", other),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a Summary,
    results: &'a [CheckResult],
}

pub fn render(format: ReportFormat, results: &[CheckResult], summary: &Summary) -> Result<String> {
    Ok(match format {
        ReportFormat::Html => html::render(results, summary),
        ReportFormat::Csv => csv::render(results),
        ReportFormat::Json => serde_json::to_string_pretty(&JsonReport { summary, results })?,
    })
}

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn path_for(&self, format: ReportFormat, summary: &Summary) -> PathBuf {
        let stamp = summary.generated_at.format("%Y-%m-%d_%H-%M-%S");
        self.dir.join(format!("content_check_report_{}.{}", stamp, format.extension()))
    }

    pub async fn write(&self, format: ReportFormat, results: &[CheckResult], summary: &Summary) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create reports directory {}", self.dir.display()))?;
        let path = self.path_for(format, summary);
        let body = render(format, results, summary)?;
        tokio::fs::write(&path, body).await.with_context(|| format!("failed to write {}", path.display()))?;
        info!("{} report saved: {}", format.extension().to_uppercase(), path.display());
        Ok(path)
    }

    pub async fn write_all(&self, formats: &[ReportFormat], results: &[CheckResult], summary: &Summary) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(formats.len());
        for &format in formats {
            written.push(self.write(format, results, summary).await?);
        }
        Ok(written)
    }
}

/// Open a report in the default browser. Failure is only logged.
pub fn open_in_browser(path: &Path) {
    let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    match webbrowser::open(&target.to_string_lossy()) {
        Ok(()) => info!("report opened in default browser"),
        Err(e) => warn!("could not auto-open report ({}); open it manually: {}", e, path.display()),
    }
}
