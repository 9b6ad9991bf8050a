//! Hadoop `/jmx` HTTP client
//!
//! One GET per scrape, bounded by a request timeout. No retries and no
//! caching; a failed fetch is reported to the caller as a [`FetchError`].

use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::FetchError;

/// Fetch result type
pub type FetchResult<T> = Result<T, FetchError>;

/// Client for one daemon's JMX servlet
#[derive(Clone)]
pub struct JmxClient {
    client: Client,
    url: String,
    timeout_ms: u64,
}

impl JmxClient {
    /// Create a client for `url`
    ///
    /// # Arguments
    /// * `url` - JMX servlet URL (e.g. "http://localhost:50070/jmx")
    /// * `timeout_ms` - Request timeout (milliseconds)
    pub fn new(url: &str, timeout_ms: u64) -> FetchResult<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(FetchError::ClientInit)?;

        Ok(Self {
            client,
            url: url.to_string(),
            timeout_ms,
        })
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw response body
    ///
    /// # Errors
    /// - [`FetchError::Timeout`] if the request exceeds the configured timeout
    /// - [`FetchError::Transport`] on connection or request failure
    /// - [`FetchError::Status`] on any non-2xx status
    /// - [`FetchError::Read`] if the body cannot be read
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> FetchResult<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                FetchError::Read {
                    url: self.url.clone(),
                    source: e,
                }
            }
        })?;

        debug!(bytes = body.len(), "Fetched JMX document");
        Ok(body.to_vec())
    }

    fn transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            self.timeout_error()
        } else {
            FetchError::Transport {
                url: self.url.clone(),
                source: err,
            }
        }
    }

    fn timeout_error(&self) -> FetchError {
        FetchError::Timeout {
            url: self.url.clone(),
            timeout_ms: self.timeout_ms,
        }
    }
}
