//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use scrape_logging::LogDestination;

/// Crawl a site through the scraping service, extract page content and list
/// the results, optionally saving the service's CSV export.
#[derive(Parser, Debug)]
#[command(name = "scrape")]
#[command(author, version, about)]
pub struct Args {
    /// Domain or site to scrape, e.g. example.com
    #[arg(required_unless_present = "check")]
    pub target: Option<String>,

    /// Base URL of the scraping service
    #[arg(long, env = "SCRAPE_API_URL")]
    pub base_url: Option<String>,

    /// Wait after each fire-and-forget stage, in milliseconds
    #[arg(long, env = "SCRAPE_SETTLE_MS", default_value_t = 5000)]
    pub settle_ms: u64,

    /// Per-request timeout in seconds (1-3600)
    #[arg(
        long,
        env = "SCRAPE_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..=3600)
    )]
    pub timeout_secs: u64,

    /// Save the CSV export once results are ready
    #[arg(short, long)]
    pub export: bool,

    /// Directory for the CSV export (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Only verify that the service answers, then exit
    #[arg(long)]
    pub check: bool,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogArg::Terminal)]
    pub log: LogArg,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogArg {
    Terminal,
    File,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::File => LogDestination::File,
            LogArg::Both => LogDestination::Both,
        }
    }
}
