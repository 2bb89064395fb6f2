//! Batch configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT, MAX_CONCURRENCY, MIN_CONCURRENCY,
};
use super::error::EngineError;

/// Settings applied uniformly to every item of a batch.
///
/// The configuration is moved into the [`DownloadEngine`](super::DownloadEngine)
/// and never changes while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Maximum number of simultaneous transfers.
    pub concurrency: usize,
    /// Per-item timeout; the batch deadline is a multiple of this.
    pub timeout: Duration,
    /// Directory receiving the downloaded files.
    pub output_dir: PathBuf,
    /// Treat an existing destination file as already downloaded.
    pub skip_existing: bool,
    /// Report every terminal state at `info` level instead of `debug`.
    pub verbose: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            skip_existing: true,
            verbose: true,
        }
    }
}

impl DownloadConfig {
    /// Default settings writing into `output_dir`.
    #[must_use]
    pub fn for_output_dir(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Checks the values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] when `concurrency` is outside
    /// `1..=100`, and [`EngineError::InvalidTimeout`] for a zero timeout.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(EngineError::InvalidConcurrency {
                value: self.concurrency,
            });
        }
        if self.timeout.is_zero() {
            return Err(EngineError::InvalidTimeout);
        }
        Ok(())
    }

    /// Length of the shared deadline for a batch of `item_count` items:
    /// `timeout * ceil(item_count / concurrency)`, never less than one timeout.
    #[must_use]
    pub fn batch_timeout(&self, item_count: usize) -> Duration {
        let waves = item_count.div_ceil(self.concurrency.max(1)).max(1);
        let waves = u32::try_from(waves).unwrap_or(u32::MAX);
        self.timeout.saturating_mul(waves)
    }
}
