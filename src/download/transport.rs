//! Transport seam between the batch engine and the network.
//!
//! The engine only needs a cancellable GET that reports a status code and
//! yields the body as a byte stream. [`HttpClient`](super::HttpClient) is the
//! reqwest-backed implementation; tests plug in instrumented transports.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

use super::error::DownloadError;

/// Body of a response, delivered chunk by chunk.
pub type BodyStream = BoxStream<'static, Result<Bytes, DownloadError>>;

/// Status and body of a GET response.
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response payload.
    pub body: BodyStream,
}

impl TransportResponse {
    /// Wraps a status code and body stream.
    #[must_use]
    pub fn new(status: u16, body: BodyStream) -> Self {
        Self { status, body }
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Issues GET requests for the download engine.
///
/// Dropping the future returned by [`get`](Transport::get), or the body
/// stream, must abort the underlying request; the engine relies on this to
/// cancel in-flight transfers when the batch deadline fires.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET request for `url` with the given User-Agent header.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] when no request can be built for
    /// `url`, and a transport error ([`DownloadError::Network`],
    /// [`DownloadError::Timeout`]) when sending fails.
    async fn get(&self, url: &str, user_agent: &str) -> Result<TransportResponse, DownloadError>;
}
