use bytes::Bytes;
use scrape_core::{FailureKind, StageFailure};

/// Failure of one remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a usable response: unreachable host,
    /// connect failure, timeout, or a body that could not be read.
    #[error("transport error calling {endpoint}: {message}")]
    Transport {
        endpoint: String,
        message: String,
        timed_out: bool,
    },
    /// The service answered, but with a failure.
    #[error("service error from {endpoint}: http {status}: {body}")]
    Service {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The client could not be set up from its settings.
    #[error("invalid api configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn transport(endpoint: &str, message: impl Into<String>) -> Self {
        ApiError::Transport {
            endpoint: endpoint.to_string(),
            message: message.into(),
            timed_out: false,
        }
    }

    pub(crate) fn service(endpoint: &str, status: u16, body: impl Into<String>) -> Self {
        ApiError::Service {
            endpoint: endpoint.to_string(),
            status,
            body: body.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport { timed_out: true, .. })
    }

    /// HTTP status for service errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The form the state machine records on a failed job.
    pub fn to_stage_failure(&self) -> StageFailure {
        let kind = match self {
            ApiError::Service { status, .. } => FailureKind::Service { status: *status },
            ApiError::Transport { .. } | ApiError::Config(_) => FailureKind::Transport,
        };
        StageFailure::new(kind, self.to_string())
    }
}

/// CSV export fetched from the service, ready to be written locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Bytes,
    /// `{target}_scraped_urls.csv`
    pub filename: String,
    /// Filename from the response's `Content-Disposition`, when sent.
    pub server_filename: Option<String>,
    pub content_type: Option<String>,
}

impl ExportArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub fn export_filename(target: &scrape_core::Target) -> String {
    format!("{target}_scraped_urls.csv")
}
