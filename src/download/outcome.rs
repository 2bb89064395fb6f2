//! Per-item download outcome.

use std::path::PathBuf;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::error::{DownloadError, FailureKind};

/// Result record for one source identifier of a batch.
///
/// A batch returns exactly one outcome per input, at the input's index.
#[derive(Debug)]
pub struct DownloadOutcome {
    /// The identifier exactly as supplied.
    pub url: String,
    /// Destination path, when one could be derived from the identifier.
    pub path: Option<PathBuf>,
    /// Whether the file is now present at `path`.
    pub success: bool,
    /// Success came from an existing file; nothing was fetched.
    pub skipped: bool,
    /// Bytes written by this batch (zero for skips and failures).
    pub bytes_written: u64,
    /// Cause of failure.
    pub error: Option<DownloadError>,
}

impl DownloadOutcome {
    /// A completed transfer.
    #[must_use]
    pub fn downloaded(url: impl Into<String>, path: PathBuf, bytes_written: u64) -> Self {
        Self {
            url: url.into(),
            path: Some(path),
            success: true,
            skipped: false,
            bytes_written,
            error: None,
        }
    }

    /// An existing file accepted without fetching.
    #[must_use]
    pub fn skipped(url: impl Into<String>, path: PathBuf) -> Self {
        Self {
            url: url.into(),
            path: Some(path),
            success: true,
            skipped: true,
            bytes_written: 0,
            error: None,
        }
    }

    /// A failed item.
    #[must_use]
    pub fn failed(url: impl Into<String>, path: Option<PathBuf>, error: DownloadError) -> Self {
        Self {
            url: url.into(),
            path,
            success: false,
            skipped: false,
            bytes_written: 0,
            error: Some(error),
        }
    }

    /// Failure category, `None` on success.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(DownloadError::kind)
    }
}

impl Serialize for DownloadOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DownloadOutcome", 7)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("success", &self.success)?;
        state.serialize_field("skipped", &self.skipped)?;
        state.serialize_field("bytes_written", &self.bytes_written)?;
        state.serialize_field("error", &self.error.as_ref().map(ToString::to_string))?;
        state.serialize_field("kind", &self.failure_kind())?;
        state.end()
    }
}
