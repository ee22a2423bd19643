use std::sync::Arc;

use anyhow::Context;
use scrape_core::{JobView, Phase};
use scrape_engine::{save_artifact, FixedDelay, Orchestrator, ReqwestScrapeApi, ScrapeApi};
use scrape_logging::{scrape_info, scrape_warn};

use crate::config::Settings;
use crate::render;

pub async fn check_service(settings: &Settings) -> anyhow::Result<()> {
    let api = ReqwestScrapeApi::new(settings.api.clone()).context("invalid --base-url")?;
    api.check_service()
        .await
        .with_context(|| format!("scraping service at {} is not reachable", api.base_url()))?;
    println!("Service at {} is reachable.", api.base_url());
    Ok(())
}

/// Runs one scrape job to completion, printing progress as it changes.
///
/// Returns `false` when the job failed.
pub async fn run(settings: &Settings, target: &str) -> anyhow::Result<bool> {
    let api = ReqwestScrapeApi::new(settings.api.clone()).context("invalid --base-url")?;
    scrape_info!("using scraping service at {}", api.base_url());
    let orchestrator = Orchestrator::new(
        Arc::new(api),
        Arc::new(FixedDelay::new(settings.settle_delay)),
    );

    let mut rx = orchestrator.subscribe();
    orchestrator
        .request_scrape(target)
        .with_context(|| format!("cannot scrape {target:?}"))?;

    let view = loop {
        let view = rx.borrow_and_update().clone();
        if let Some(line) = render::status_line(&view) {
            println!("{line}");
        }
        if view.phase.is_settled() {
            break view;
        }
        if rx.changed().await.is_err() {
            break orchestrator.snapshot();
        }
    };

    let Some(job) = view.job.as_ref() else {
        anyhow::bail!("no job was started");
    };
    if view.phase == Phase::Failed {
        if let Some(error) = job.last_error() {
            scrape_warn!("{:?} stage failed: {}", error.stage, error.detail);
        }
        return Ok(false);
    }

    print!("{}", render::render_results(job.results()));

    if settings.export {
        export(&orchestrator, &view, settings).await?;
    }
    Ok(true)
}

async fn export(
    orchestrator: &Orchestrator,
    view: &JobView,
    settings: &Settings,
) -> anyhow::Result<()> {
    if !view.can_export {
        println!("Nothing to export.");
        return Ok(());
    }
    let artifact = orchestrator
        .export_results()
        .await
        .context("failed to download the CSV export")?;
    let path = save_artifact(&settings.out_dir, &artifact)
        .with_context(|| format!("failed to save export into {}", settings.out_dir.display()))?;
    println!("Saved {} bytes to {}", artifact.len(), path.display());
    Ok(())
}
