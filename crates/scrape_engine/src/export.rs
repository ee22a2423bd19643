use scrape_core::{Phase, ScrapeJob};
use scrape_logging::{scrape_info, scrape_warn};

use crate::{ApiError, ExportArtifact, ScrapeApi};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("results are not ready for export (job is {phase})")]
    NotReady { phase: Phase },
    #[error("export failed: {0}")]
    Fetch(#[from] ApiError),
}

/// Fetches the export for a job that [`ScrapeJob::can_export`].
///
/// Readiness is checked before any network call. Failures are returned to
/// the caller only; the job itself is not touched.
pub async fn export_results(
    api: &dyn ScrapeApi,
    job: &ScrapeJob,
) -> Result<ExportArtifact, ExportError> {
    if !job.can_export() {
        return Err(ExportError::NotReady { phase: job.phase() });
    }

    match api.fetch_export_artifact(job.target()).await {
        Ok(artifact) => {
            scrape_info!(
                "exported {} bytes for {} as {}",
                artifact.len(),
                job.target(),
                artifact.filename
            );
            Ok(artifact)
        }
        Err(err) => {
            scrape_warn!("export for {} failed: {}", job.target(), err);
            Err(ExportError::Fetch(err))
        }
    }
}
