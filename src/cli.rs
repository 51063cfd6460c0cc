use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Check radio, music, movie and TV channel catalogs for dead content
#[derive(Debug, Parser)]
#[command(name = "mediacheck", version)]
#[command(about = "Headless-browser liveness checks for media catalogs", long_about = None)]
pub struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Settings file (TOML). Defaults to config.toml in the user config directory.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch the feeds, check every item and write reports
    Check {
        /// Comma-separated feed files (channels, music, radio, movies) or "all"
        #[arg(long, default_value = "all")]
        files: String,

        /// Report formats: html, csv, json (comma-separated) or "all"
        #[arg(long, default_value = "html")]
        output: String,

        /// Do not open the HTML report in a browser
        #[arg(long, action = ArgAction::SetTrue)]
        no_open: bool,

        /// Timeout in seconds for generic embed checks
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Maximum number of concurrent checks
        #[arg(long, value_name = "N")]
        max_concurrent: Option<usize>,

        /// Directory for generated reports
        #[arg(long, value_name = "DIR")]
        reports_dir: Option<PathBuf>,
    },
    /// Fetch and normalize the feeds without checking anything
    Items {
        #[arg(long, default_value = "all")]
        files: String,
    },
    /// Classify a single URL and print the result as JSON
    Probe {
        /// Content type: radio, music, movie or channel
        #[arg(long = "type", value_name = "TYPE")]
        kind: String,

        /// Video-platform id; extracted from the URL when omitted
        #[arg(long)]
        video_id: Option<String>,

        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_with_overrides() {
        let cli = Cli::parse_from(["mediacheck", "-v", "check", "--files", "radio,music", "--output", "all", "--no-open", "--max-concurrent", "5"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Check { files, output, no_open, max_concurrent, timeout, .. } => {
                assert_eq!((files.as_str(), output.as_str()), ("radio,music", "all"));
                assert!(no_open);
                assert_eq!(max_concurrent, Some(5));
                assert_eq!(timeout, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn probe_takes_type_and_url() {
        let cli = Cli::parse_from(["mediacheck", "probe", "--type", "channel", "https://tv/embed", "--config", "x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Probe { kind, url, video_id } => {
                assert_eq!((kind.as_str(), url.as_str(), video_id), ("channel", "https://tv/embed", None));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
