use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Response;
use scrape_core::{RawResults, Target};
use scrape_logging::{scrape_debug, scrape_trace, scrape_warn};
use serde_json::Value;
use url::Url;

use crate::filename::parse_content_disposition;
use crate::types::export_filename;
use crate::{ApiError, ExportArtifact};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const START_CRAWL_PATH: &str = "scrape/";
const START_CONTENT_PATH: &str = "scrape-content/";
const RESULTS_PATH: &str = "scraped-urls/";
const EXPORT_PATH: &str = "download-csv/";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Cap on any response body read, results or export.
    pub max_body_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ApiSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// The remote scraping service's operations.
///
/// Implementations hold no job state; every call names its target.
#[async_trait::async_trait]
pub trait ScrapeApi: Send + Sync {
    /// Fires the crawl job. The service does not report when it finishes.
    async fn start_crawl(&self, target: &Target) -> Result<(), ApiError>;

    /// Fires content extraction over the crawled pages.
    async fn start_content_extraction(&self, target: &Target) -> Result<(), ApiError>;

    /// Current result collection, un-normalized. A missing collection is not an error.
    async fn fetch_results(&self, target: &Target) -> Result<RawResults, ApiError>;

    /// The CSV export for the target's results.
    async fn fetch_export_artifact(&self, target: &Target) -> Result<ExportArtifact, ApiError>;

    /// Verifies the service is reachable.
    async fn check_service(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestScrapeApi {
    client: reqwest::Client,
    base_url: Url,
    settings: ApiSettings,
}

impl ReqwestScrapeApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(settings.base_url.trim())
            .map_err(|err| ApiError::Config(format!("base url {:?}: {err}", settings.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "base url {:?} cannot be a base",
                settings.base_url
            )));
        }
        // Keep any path prefix when joining endpoint paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Config(err.to_string()))?;

        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, target: &Target) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| ApiError::Config(err.to_string()))?;
        url.query_pairs_mut().append_pair("domain", target.as_str());
        Ok(url)
    }

    async fn trigger(&self, path: &str, target: &Target) -> Result<(), ApiError> {
        let url = self.endpoint(path, target)?;
        scrape_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|err| map_reqwest_error(path, err))?;
        ensure_success(path, response).await?;
        Ok(())
    }

    async fn read_limited(&self, path: &str, response: Response) -> Result<Bytes, ApiError> {
        let max_bytes = self.settings.max_body_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::transport(
                    path,
                    format!("response too large (max {max_bytes}, actual {content_len})"),
                ));
            }
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| map_reqwest_error(path, err))?;
            let next_len = buffer.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::transport(
                    path,
                    format!("response too large (max {max_bytes}, actual at least {next_len})"),
                ));
            }
            buffer.extend_from_slice(&chunk);
            scrape_trace!("{} read {} bytes", path, buffer.len());
        }
        Ok(buffer.freeze())
    }
}

#[async_trait::async_trait]
impl ScrapeApi for ReqwestScrapeApi {
    async fn start_crawl(&self, target: &Target) -> Result<(), ApiError> {
        self.trigger(START_CRAWL_PATH, target).await
    }

    async fn start_content_extraction(&self, target: &Target) -> Result<(), ApiError> {
        self.trigger(START_CONTENT_PATH, target).await
    }

    async fn fetch_results(&self, target: &Target) -> Result<RawResults, ApiError> {
        let url = self.endpoint(RESULTS_PATH, target)?;
        scrape_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| map_reqwest_error(RESULTS_PATH, err))?;
        let response = ensure_success(RESULTS_PATH, response).await?;
        let body = self.read_limited(RESULTS_PATH, response).await?;
        Ok(parse_results_envelope(RESULTS_PATH, &body))
    }

    async fn fetch_export_artifact(&self, target: &Target) -> Result<ExportArtifact, ApiError> {
        let url = self.endpoint(EXPORT_PATH, target)?;
        scrape_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| map_reqwest_error(EXPORT_PATH, err))?;
        let response = ensure_success(EXPORT_PATH, response).await?;
        let status = response.status().as_u16();

        let content_type = header_text(&response, CONTENT_TYPE);
        let server_filename =
            header_text(&response, CONTENT_DISPOSITION).and_then(|v| parse_content_disposition(&v));
        let bytes = self.read_limited(EXPORT_PATH, response).await?;

        // The service answers an unknown target with a JSON error and 200.
        if content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"))
        {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|value| envelope_error(&value))
                .unwrap_or_else(|| "export is not available".to_string());
            return Err(ApiError::service(EXPORT_PATH, status, message));
        }

        Ok(ExportArtifact {
            bytes,
            filename: export_filename(target),
            server_filename,
            content_type,
        })
    }

    async fn check_service(&self) -> Result<(), ApiError> {
        scrape_debug!("GET {}", self.base_url);
        let response = self
            .client
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|err| map_reqwest_error("/", err))?;
        ensure_success("/", response).await?;
        Ok(())
    }
}

/// Unwraps `{ "scraped_urls": ... }`, also accepting `results` as the key.
///
/// A 2xx envelope without a collection is an empty result, even when it
/// carries an in-band `error` (the service's answer for an unknown domain);
/// that text is only logged. A body that is not JSON is passed on as an
/// unrecognized payload for the normalizer to reject.
fn parse_results_envelope(path: &str, body: &[u8]) -> RawResults {
    if body.iter().all(u8::is_ascii_whitespace) {
        return RawResults::Missing;
    }
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            scrape_debug!("{} returned non-json body: {}", path, err);
            return RawResults::Other(Value::String(String::from_utf8_lossy(body).into_owned()));
        }
    };

    match value {
        Value::Object(mut envelope) => {
            if let Some(results) = envelope
                .remove("scraped_urls")
                .or_else(|| envelope.remove("results"))
            {
                return RawResults::from_value(results);
            }
            if let Some(message) = envelope_error(&Value::Object(envelope)) {
                scrape_warn!("{} answered without results: {}", path, message);
            }
            RawResults::Missing
        }
        other => RawResults::from_value(other),
    }
}

fn envelope_error(value: &Value) -> Option<String> {
    value
        .get("error")
        .or_else(|| value.get("detail"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

async fn ensure_success(path: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::service(path, status.as_u16(), body))
}

fn header_text(response: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

fn map_reqwest_error(path: &str, err: reqwest::Error) -> ApiError {
    ApiError::Transport {
        endpoint: path.to_string(),
        message: err.to_string(),
        timed_out: err.is_timeout(),
    }
}
