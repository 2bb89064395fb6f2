//! Error types for the download module.
//!
//! This module defines structured errors for all download operations,
//! providing context-rich error messages for logging and user feedback.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};

/// Errors that can occur while downloading a single item.
///
/// Every variant except [`DownloadError::OutputDir`] is local to one outcome
/// and never affects sibling downloads.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The output directory could not be created; the whole batch is skipped.
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error, shared by every slot of the batch.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The source identifier was an empty string.
    #[error("empty URL")]
    EmptyUrl,

    /// The request could not be built from the identifier.
    #[error("error creating request: invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("error sending request to {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The transport gave up before the server answered.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The shared batch deadline elapsed before this download finished.
    #[error("batch deadline exceeded downloading {url}")]
    DeadlineExceeded {
        /// The URL that was still pending.
        url: String,
    },

    /// The batch was cancelled before this download finished.
    #[error("download of {url} cancelled")]
    Cancelled {
        /// The URL that was still pending.
        url: String,
    },

    /// The server answered with anything other than 200 OK.
    #[error("received non-200 status code: {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The destination file could not be created.
    #[error("error creating file {path}: {source}")]
    CreateFile {
        /// The destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the payload to the destination failed.
    #[error("error writing to file {path}: {source}")]
    Write {
        /// The destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The task owning this item panicked.
    #[error("download task for {url} panicked")]
    TaskPanicked {
        /// The URL the task was downloading.
        url: String,
    },

    /// The concurrency limiter was closed before a slot was granted.
    #[error("concurrency limiter closed before {url} could start")]
    LimiterClosed {
        /// The URL that was waiting for a slot.
        url: String,
    },
}

/// Coarse failure categories, for callers that branch on the kind of failure
/// rather than on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Output directory setup failed (batch-fatal).
    Setup,
    /// The identifier itself was unusable.
    InvalidInput,
    /// The request could not be constructed.
    Request,
    /// Connection, TLS or transport timeout failure.
    Transport,
    /// Deadline expiry or batch cancellation.
    Cancelled,
    /// Non-200 response status.
    HttpStatus,
    /// Destination file could not be created.
    CreateFile,
    /// Streaming the payload to disk failed.
    Write,
    /// Internal failure such as a panicked task.
    Internal,
}

impl DownloadError {
    /// Creates an output directory error.
    pub fn output_dir(path: impl Into<PathBuf>, source: Arc<std::io::Error>) -> Self {
        Self::OutputDir {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a deadline-exceeded error.
    pub fn deadline_exceeded(url: impl Into<String>) -> Self {
        Self::DeadlineExceeded { url: url.into() }
    }

    /// Creates a cancellation error.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a file creation error.
    pub fn create_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a panicked-task error.
    pub fn task_panicked(url: impl Into<String>) -> Self {
        Self::TaskPanicked { url: url.into() }
    }

    /// Returns the failure category of this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::OutputDir { .. } => FailureKind::Setup,
            Self::EmptyUrl => FailureKind::InvalidInput,
            Self::InvalidUrl { .. } => FailureKind::Request,
            Self::Network { .. } | Self::Timeout { .. } => FailureKind::Transport,
            Self::DeadlineExceeded { .. } | Self::Cancelled { .. } => FailureKind::Cancelled,
            Self::HttpStatus { .. } => FailureKind::HttpStatus,
            Self::CreateFile { .. } => FailureKind::CreateFile,
            Self::Write { .. } => FailureKind::Write,
            Self::TaskPanicked { .. } | Self::LimiterClosed { .. } => FailureKind::Internal,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path that the source error does not carry.

/// Errors raised while constructing a [`DownloadEngine`](super::DownloadEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// A zero timeout would expire every batch immediately.
    #[error("invalid timeout: must be greater than zero")]
    InvalidTimeout,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_empty_url_display() {
        assert_eq!(DownloadError::EmptyUrl.to_string(), "empty URL");
    }

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status("https://example.com/cat.png", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/cat.png"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_download_error_io_variants_display_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::create_file("/tmp/cat.png", io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/cat.png"), "Expected path in: {msg}");
        assert!(msg.contains("access denied"), "Expected cause in: {msg}");

        let io_error = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        let error = DownloadError::write("/tmp/cat.png", io_error);
        assert!(error.to_string().contains("error writing to file"));
    }

    #[test]
    fn test_download_error_output_dir_keeps_source() {
        use std::error::Error as _;

        let io_error = Arc::new(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        let error = DownloadError::output_dir("/ro/out", io_error);
        assert!(error.to_string().contains("/ro/out"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_failure_kind_mapping() {
        assert_eq!(DownloadError::EmptyUrl.kind(), FailureKind::InvalidInput);
        assert_eq!(
            DownloadError::invalid_url("nope").kind(),
            FailureKind::Request
        );
        assert_eq!(DownloadError::timeout("u").kind(), FailureKind::Transport);
        assert_eq!(
            DownloadError::deadline_exceeded("u").kind(),
            FailureKind::Cancelled
        );
        assert_eq!(DownloadError::cancelled("u").kind(), FailureKind::Cancelled);
        assert_eq!(
            DownloadError::http_status("u", 500).kind(),
            FailureKind::HttpStatus
        );
        assert_eq!(
            DownloadError::task_panicked("u").kind(),
            FailureKind::Internal
        );
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::HttpStatus).unwrap();
        assert_eq!(json, "\"http_status\"");
    }

    #[test]
    fn test_engine_error_display() {
        let error = EngineError::InvalidConcurrency { value: 0 };
        let msg = error.to_string();
        assert!(msg.contains("invalid concurrency"));
        assert!(msg.contains('0'));
        assert!(msg.contains("100")); // max
    }
}
