//! Resolved runtime settings.

use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;
use scrape_engine::{ApiSettings, DEFAULT_BASE_URL};
use scrape_logging::{level_from_verbosity, LogDestination};

use crate::cli::Args;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub settle_delay: Duration,
    pub out_dir: PathBuf,
    pub export: bool,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
}

impl Settings {
    /// Flags win over environment (clap reads `SCRAPE_*` variables), which
    /// win over built-in defaults.
    pub fn from_args(args: &Args) -> Self {
        let base_url = args
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);

        let api = ApiSettings {
            request_timeout: Duration::from_secs(args.timeout_secs),
            ..ApiSettings::with_base_url(base_url)
        };

        Self {
            api,
            settle_delay: Duration::from_millis(args.settle_ms),
            out_dir: args.out.clone().unwrap_or_else(|| PathBuf::from(".")),
            export: args.export,
            log_destination: args.log.into(),
            log_level: level_from_verbosity(args.verbose),
        }
    }
}
