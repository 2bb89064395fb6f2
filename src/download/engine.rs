//! Download engine for concurrent batch downloads.
//!
//! This module provides the `DownloadEngine` which coordinates a batch of
//! downloads using a semaphore-based concurrency control pattern and a single
//! deadline shared by every task of the batch.
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::{DownloadConfig, DownloadEngine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::with_http_client(DownloadConfig::for_output_dir("./downloads"))?;
//! let urls = vec!["https://example.com/a.png".to_string()];
//! let outcomes = engine.run_batch(&urls).await;
//! let stats = engine.stats();
//! println!("Downloaded: {}, Skipped: {}, Failed: {}", stats.downloaded(), stats.skipped(), stats.failed());
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use super::client::HttpClient;
use super::config::DownloadConfig;
use super::deadline::BatchDeadline;
use super::error::{DownloadError, EngineError};
use super::outcome::DownloadOutcome;
use super::transport::Transport;
use super::worker::{self, destination_for};

/// Live counters for the batches run by one engine.
///
/// Uses atomic counters for thread-safe updates from concurrent download
/// tasks, so a progress display can poll them while a batch is running.
/// Counts accumulate across batches run by the same engine.
#[derive(Debug, Default)]
pub struct DownloadStats {
    downloaded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of files fetched and written.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded.load(Ordering::SeqCst)
    }

    /// Returns the number of items satisfied by an existing file.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Returns the number of failed items.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the number of successful items (downloaded + skipped).
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.downloaded() + self.skipped()
    }

    /// Returns the total number of items finished.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded() + self.failed()
    }

    /// Counts one finished outcome.
    fn record(&self, outcome: &DownloadOutcome) {
        let counter = match (outcome.success, outcome.skipped) {
            (true, true) => &self.skipped,
            (true, false) => &self.downloaded,
            (false, _) => &self.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Download engine for concurrent batch downloads.
///
/// # Concurrency Model
///
/// - Each identifier gets its own Tokio task, all spawned up front
/// - Each batch gets its own semaphore, so overlapping batches on one engine
///   do not share permits
/// - A semaphore permit is acquired before the per-item work starts
/// - Permits are released automatically when the task ends (RAII), including
///   on panic
/// - Permit waits, requests, body reads and file writes are all raced against
///   the batch deadline
/// - Join handles are awaited in input order, so outcomes keep their input
///   index regardless of completion order
pub struct DownloadEngine {
    /// Batch configuration, fixed for the engine's lifetime.
    config: Arc<DownloadConfig>,
    /// Network collaborator shared by all tasks.
    transport: Arc<dyn Transport>,
    /// Live counters.
    stats: Arc<DownloadStats>,
}

impl std::fmt::Debug for DownloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadEngine")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl DownloadEngine {
    /// Creates a new download engine over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the concurrency is
    /// outside 1-100, or [`EngineError::InvalidTimeout`] for a zero timeout.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use harvester_core::{DownloadConfig, DownloadEngine, HttpClient};
    ///
    /// let engine = DownloadEngine::new(DownloadConfig::default(), Arc::new(HttpClient::new())).unwrap();
    /// assert_eq!(engine.concurrency(), 5);
    /// ```
    #[instrument(level = "debug", skip(transport))]
    pub fn new(config: DownloadConfig, transport: Arc<dyn Transport>) -> Result<Self, EngineError> {
        config.validate()?;

        debug!(
            concurrency = config.concurrency,
            timeout_ms = config.timeout.as_millis(),
            output_dir = %config.output_dir.display(),
            skip_existing = config.skip_existing,
            "creating download engine"
        );

        Ok(Self {
            config: Arc::new(config),
            transport,
            stats: Arc::new(DownloadStats::new()),
        })
    }

    /// Creates an engine backed by a default [`HttpClient`].
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`new`](Self::new), or
    /// [`EngineError::Client`] if the HTTP client cannot be built.
    pub fn with_http_client(config: DownloadConfig) -> Result<Self, EngineError> {
        let client = HttpClient::try_new()?;
        Self::new(config, Arc::new(client))
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.config.concurrency
    }

    /// Returns the batch configuration.
    #[must_use]
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Returns the live counters, shareable with a progress display.
    #[must_use]
    pub fn stats(&self) -> Arc<DownloadStats> {
        Arc::clone(&self.stats)
    }

    /// Builds the shared deadline for a batch of `item_count` identifiers.
    ///
    /// Callers that want to cancel a batch early create the deadline here,
    /// keep a clone, and pass it to [`run_batch_until`](Self::run_batch_until).
    #[must_use]
    pub fn deadline_for(&self, item_count: usize) -> BatchDeadline {
        BatchDeadline::after(self.config.batch_timeout(item_count))
    }

    /// Downloads every identifier, returning one outcome per input in input order.
    ///
    /// The batch deadline is `timeout * ceil(len / concurrency)`.
    pub async fn run_batch(&self, urls: &[String]) -> Vec<DownloadOutcome> {
        let deadline = self.deadline_for(urls.len());
        self.run_batch_until(urls, &deadline).await
    }

    /// Downloads every identifier under a caller-supplied deadline.
    ///
    /// This method:
    /// 1. Creates the output directory (all slots fail if that is impossible)
    /// 2. Spawns one task per identifier, gated by the semaphore
    /// 3. Waits for every task to finish or be cut short by the deadline
    /// 4. Returns the outcomes in input order
    ///
    /// Individual failures never abort sibling downloads.
    #[instrument(skip(self, urls, deadline), fields(items = urls.len(), output_dir = %self.config.output_dir.display()))]
    pub async fn run_batch_until(
        &self,
        urls: &[String],
        deadline: &BatchDeadline,
    ) -> Vec<DownloadOutcome> {
        info!(concurrency = self.config.concurrency, "starting batch");

        if let Err(e) = tokio::fs::create_dir_all(&self.config.output_dir).await {
            error!(error = %e, "failed to create output directory");
            return self.fail_setup(urls, &self.config.output_dir, e);
        }

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let url = url.clone();
            let semaphore = Arc::clone(&semaphore);
            let transport = Arc::clone(&self.transport);
            let config = Arc::clone(&self.config);
            let stats = Arc::clone(&self.stats);
            let deadline = deadline.clone();

            handles.push(tokio::spawn(async move {
                let outcome =
                    run_slot(&url, &semaphore, transport.as_ref(), &config, &deadline).await;
                stats.record(&outcome);
                outcome
            }));
        }

        debug!(task_count = handles.len(), "waiting for downloads to complete");

        let mut outcomes = Vec::with_capacity(urls.len());
        for (handle, url) in handles.into_iter().zip(urls) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(url = %url, error = %e, "download task panicked");
                    let outcome = DownloadOutcome::failed(
                        url.clone(),
                        destination_for(&self.config.output_dir, url),
                        DownloadError::task_panicked(url.clone()),
                    );
                    self.stats.record(&outcome);
                    outcome
                }
            };
            outcomes.push(outcome);
        }

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        info!(
            succeeded,
            failed = outcomes.len() - succeeded,
            total = outcomes.len(),
            "batch complete"
        );

        outcomes
    }

    /// Marks every slot failed after the output directory could not be created.
    fn fail_setup(
        &self,
        urls: &[String],
        output_dir: &Path,
        error: std::io::Error,
    ) -> Vec<DownloadOutcome> {
        let source = Arc::new(error);
        urls.iter()
            .map(|url| {
                let outcome = DownloadOutcome::failed(
                    url.clone(),
                    None,
                    DownloadError::output_dir(output_dir, Arc::clone(&source)),
                );
                self.stats.record(&outcome);
                outcome
            })
            .collect()
    }
}

/// Waits for a permit, then runs the per-item procedure while holding it.
async fn run_slot(
    url: &str,
    semaphore: &Arc<Semaphore>,
    transport: &dyn Transport,
    config: &DownloadConfig,
    deadline: &BatchDeadline,
) -> DownloadOutcome {
    let permit = tokio::select! {
        biased;
        expiry = deadline.expired() => Err(expiry.into_error(url)),
        permit = Arc::clone(semaphore).acquire_owned() => {
            permit.map_err(|_| DownloadError::LimiterClosed { url: url.to_string() })
        }
    };

    let _permit = match permit {
        Ok(permit) => permit,
        Err(error) => {
            debug!(url, error = %error, "download not started");
            return DownloadOutcome::failed(
                url,
                destination_for(&config.output_dir, url),
                error,
            );
        }
    };

    // The deadline may have passed while this task was waiting.
    if let Some(expiry) = deadline.check() {
        return DownloadOutcome::failed(
            url,
            destination_for(&config.output_dir, url),
            expiry.into_error(url),
        );
    }

    worker::process_item(transport, deadline, config, url).await
}

/// Downloads `urls` with `config` using a default [`HttpClient`].
///
/// # Errors
///
/// Returns [`EngineError`] if the configuration is invalid or the HTTP
/// client cannot be built.
pub async fn download_all(
    urls: &[String],
    config: DownloadConfig,
) -> Result<Vec<DownloadOutcome>, EngineError> {
    let engine = DownloadEngine::with_http_client(config)?;
    Ok(engine.run_batch(urls).await)
}

/// Downloads `urls` into `output_dir` with default settings.
///
/// # Errors
///
/// Returns [`EngineError::Client`] if the HTTP client cannot be built.
pub async fn download_to_dir(
    urls: &[String],
    output_dir: impl AsRef<Path>,
) -> Result<Vec<DownloadOutcome>, EngineError> {
    download_all(urls, DownloadConfig::for_output_dir(output_dir)).await
}
