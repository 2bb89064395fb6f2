//! HTTP client wrapper implementing [`Transport`].
//!
//! This module provides the `HttpClient` struct which issues the GET
//! requests for a batch and exposes response bodies as byte streams.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, instrument};
use url::Url;

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::{DownloadError, EngineError};
use super::transport::{Transport, TransportResponse};

/// HTTP client for streaming downloads.
///
/// This client is designed to be created once and shared by every task of a
/// batch, taking advantage of connection pooling. Only the connect phase has
/// its own timeout; the batch deadline bounds the rest of each transfer.
///
/// # Example
///
/// ```no_run
/// use harvester_core::{HttpClient, Transport, CLIENT_USER_AGENT};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::try_new()?;
/// let response = client.get("https://example.com/cat.png", CLIENT_USER_AGENT).await?;
/// println!("status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with the default connect timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice; use
    /// [`try_new`](Self::try_new) to handle the error instead.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::try_new().expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client with the default connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Client`] if reqwest cannot build the client
    /// (for example when the TLS backend fails to initialize).
    pub fn try_new() -> Result<Self, EngineError> {
        Self::with_connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with an explicit connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Client`] if reqwest cannot build the client.
    #[instrument(level = "debug")]
    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .gzip(true)
            .build()
            .map_err(EngineError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(level = "debug", skip(self, user_agent), fields(url = %url))]
    async fn get(&self, url: &str, user_agent: &str) -> Result<TransportResponse, DownloadError> {
        // Validate URL
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| map_send_error(url, e))?;

        let status = response.status().as_u16();
        debug!(status, "response received");

        let owned_url = url.to_string();
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| DownloadError::network(owned_url.clone(), e)))
            .boxed();

        Ok(TransportResponse::new(status, body))
    }
}

fn map_send_error(url: &str, error: reqwest::Error) -> DownloadError {
    if error.is_builder() {
        DownloadError::invalid_url(url)
    } else if error.is_timeout() {
        DownloadError::timeout(url)
    } else {
        DownloadError::network(url, error)
    }
}
