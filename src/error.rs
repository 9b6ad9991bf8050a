//! Error types for hadoop-jmx-exporter
//!
//! Each layer of a scrape cycle has its own error type:
//! - [`FetchError`] for the HTTP fetch of the `/jmx` servlet
//! - [`MapError`] for turning the fetched document into a metric snapshot
//! - [`ScrapeError`] for the whole cycle, wrapping both
//!
//! [`AppError`] is the HTTP-facing error returned by handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure while fetching the raw JMX document
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client could not be built
    #[error("Failed to initialize HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),

    /// Connection or request could not be completed
    #[error("Transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint did not answer within the configured timeout
    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// Non-2xx response; the body is not trusted
    #[error("HTTP error status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be read
    #[error("Failed to read response body from {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// HTTP status code, if the endpoint answered with one
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure while mapping a JMX document onto metrics
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// Document is not JSON or does not have the `{"beans": [...]}` shape
    #[error("Malformed JMX document: {0}")]
    Malformed(String),

    /// A required field was absent or had the wrong type
    #[error("Required field '{metric}' missing or mistyped in bean '{bean}'")]
    MissingRequiredField { metric: String, bean: String },
}

impl MapError {
    /// Metric name of the unresolved required field, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            MapError::MissingRequiredField { metric, .. } => Some(metric.as_str()),
            MapError::Malformed(_) => None,
        }
    }
}

/// Failure of one whole collection cycle
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Fetch step failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Mapping step failed
    #[error(transparent)]
    Map(#[from] MapError),
}

impl ScrapeError {
    /// Stable failure kind, used as a metric label and log field
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Fetch(_) => "fetch",
            ScrapeError::Map(MapError::Malformed(_)) => "malformed",
            ScrapeError::Map(MapError::MissingRequiredField { .. }) => "missing_field",
        }
    }

    /// Offending field for `missing_field` failures
    pub fn field(&self) -> Option<&str> {
        match self {
            ScrapeError::Map(e) => e.field(),
            ScrapeError::Fetch(_) => None,
        }
    }
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Scrape cycle failed and stale values are not being served
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, public_message, log_message) = match self {
            AppError::Scrape(e) => (StatusCode::BAD_GATEWAY, "Upstream error", e.to_string()),
        };

        tracing::error!(status = %status, error = %log_message, "Request failed");

        (status, public_message).into_response()
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;
