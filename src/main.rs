mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use mediacheck::feed::extract_video_id;
use mediacheck::prelude::*;
use mediacheck::report;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info,mediacheck=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Check { files, output, no_open, timeout, max_concurrent, reports_dir } => {
            if let Some(t) = timeout { settings.timeouts.default_secs = t; }
            if let Some(n) = max_concurrent { settings.checks.max_concurrent = n; }
            if let Some(dir) = reports_dir { settings.reports.dir = dir; }
            let Some(kinds) = parse_kinds(&files) else { return Ok(ExitCode::FAILURE) };
            let formats = ReportFormat::parse_list(&output)?;
            check(&settings, &kinds, &formats, !no_open).await
        }
        Commands::Items { files } => {
            let Some(kinds) = parse_kinds(&files) else { return Ok(ExitCode::FAILURE) };
            let items = FeedClient::new(settings.feeds.clone())?.fetch_all(&kinds).await;
            for item in &items {
                println!("{}\t{}\t{}", item.kind, item.name, item.url.as_deref().unwrap_or("-"));
            }
            println!("{} items", items.len());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Probe { kind, video_id, url } => {
            let video_id = video_id.or_else(|| extract_video_id(&url));
            let item = ContentItem::new(ContentType::from(kind), url.clone(), Some(url)).with_video_id(video_id);
            let results = with_browser(&settings, std::slice::from_ref(&item)).await?;
            for r in &results {
                println!("{}", serde_json::to_string_pretty(r)?);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn parse_kinds(files: &str) -> Option<Vec<FeedKind>> {
    match FeedKind::parse_list(files) {
        Ok(kinds) => Some(kinds),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

async fn check(settings: &Settings, kinds: &[FeedKind], formats: &[ReportFormat], open: bool) -> Result<ExitCode> {
    let names: Vec<_> = kinds.iter().map(|k| k.name()).collect();
    info!("checking files: {}", names.join(", "));
    let items = FeedClient::new(settings.feeds.clone())?.fetch_all(kinds).await;
    if items.is_empty() {
        eprintln!("No content items found. Exiting.");
        return Ok(ExitCode::FAILURE);
    }
    info!("total items to check: {}", items.len());

    let results = with_browser(settings, &items).await?;
    let summary = Summary::from_results(&results);
    println!("\nCHECK SUMMARY\n{}", summary.render_table());

    let writer = ReportWriter::new(&settings.reports.dir);
    let written = writer.write_all(formats, &results, &summary).await?;
    println!("Reports written to {}:", writer.dir().display());
    for path in &written {
        println!("  - {}", path.display());
    }
    if open {
        if let Some(html) = written.iter().find(|p| has_extension(p, ReportFormat::Html)) {
            report::open_in_browser(html);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Launch one browser for the whole run, check `items` and shut the browser down.
async fn with_browser(settings: &Settings, items: &[ContentItem]) -> Result<Vec<CheckResult>> {
    let gateway = Arc::new(ChromiumGateway::launch(&settings.browser).await?);
    let classifier = Classifier::new(gateway.clone(), settings.classifier_config());
    let checker = Checker::new(classifier, settings.checker_options());
    let results = checker.check_all(items).await;
    drop(checker);

    match Arc::try_unwrap(gateway) {
        Ok(gateway) => {
            if let Err(e) = gateway.shutdown().await.context("browser shutdown") {
                warn!("{:#}", e);
            }
        }
        Err(_) => warn!("browser still in use; leaving it to exit with the process"),
    }
    Ok(results)
}

fn has_extension(path: &Path, format: ReportFormat) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(format.extension())
}
