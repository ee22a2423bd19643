//! Scrape engine: remote API client, settle timing and effect execution.
mod api;
mod export;
mod filename;
mod orchestrator;
mod persist;
mod settle;
mod types;

pub use api::{ApiSettings, ReqwestScrapeApi, ScrapeApi, DEFAULT_BASE_URL};
pub use export::{export_results, ExportError};
pub use filename::{parse_content_disposition, sanitize_filename};
pub use orchestrator::Orchestrator;
pub use persist::{ensure_output_dir, save_artifact, AtomicFileWriter, PersistError};
pub use settle::{FixedDelay, SettleAwaiter};
pub use types::{export_filename, ApiError, ExportArtifact};
