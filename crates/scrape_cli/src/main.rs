mod app;
mod cli;
mod config;
mod render;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use scrape_logging::DEFAULT_LOG_FILE;

use crate::cli::Args;
use crate::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let settings = Settings::from_args(&args);
    scrape_logging::initialize(
        settings.log_destination,
        settings.log_level,
        Some(Path::new(DEFAULT_LOG_FILE)),
    );

    let succeeded = match args.target.as_deref() {
        Some(target) if !args.check => app::run(&settings, target).await?,
        _ => {
            app::check_service(&settings).await?;
            true
        }
    };
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
