use std::path::PathBuf;

use clap::Parser;
use engine_logging::{LogDestination, LogSettings};
use log::LevelFilter;

use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "crawler",
    version,
    about = "Breadth-first web crawler that prints the words and links of every page it reaches"
)]
pub(crate) struct Cli {
    /// Absolute http:// or https:// URL to start from
    #[arg(value_name = "SEED")]
    pub seed: String,

    /// Stop after this many URLs have been dequeued
    #[arg(long)]
    pub max_urls: Option<usize>,

    /// Redirect targets followed along one chain of 3xx responses
    #[arg(long)]
    pub max_redirects: Option<u32>,

    /// Fail a fetch whose body exceeds this many bytes
    #[arg(long)]
    pub max_body_bytes: Option<u64>,

    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// RON file with `budget` and `fetch` sections; flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print one JSON object per crawl event instead of text
    #[arg(long)]
    pub json: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub(crate) fn log_settings(&self) -> LogSettings {
        let destination = match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        };
        let level = if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        LogSettings { destination, level }
    }

    pub(crate) fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}
