//! Shared batch deadline with explicit cancellation.
//!
//! One [`BatchDeadline`] is created per batch and cloned into every task.
//! Clones share the same expiry instant and the same cancellation token, so
//! expiry or [`cancel`](BatchDeadline::cancel) is observed by every in-flight
//! download at its next suspension point.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::DownloadError;

/// Upper bound used when `now + duration` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Why a deadline stopped waiting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The expiry instant was reached.
    Elapsed,
    /// [`BatchDeadline::cancel`] was called.
    Cancelled,
}

impl Expiry {
    /// Converts the expiry into the error recorded for `url`.
    #[must_use]
    pub fn into_error(self, url: &str) -> DownloadError {
        match self {
            Self::Elapsed => DownloadError::deadline_exceeded(url),
            Self::Cancelled => DownloadError::cancelled(url),
        }
    }
}

/// Expiry instant plus cancellation token shared by all downloads of a batch.
#[derive(Debug, Clone)]
pub struct BatchDeadline {
    expires_at: Instant,
    token: CancellationToken,
}

impl BatchDeadline {
    /// Creates a deadline `duration` from now.
    #[must_use]
    pub fn after(duration: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(duration)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self::at(expires_at)
    }

    /// Creates a deadline expiring at `expires_at`.
    #[must_use]
    pub fn at(expires_at: Instant) -> Self {
        Self {
            expires_at,
            token: CancellationToken::new(),
        }
    }

    /// Returns the expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Aborts the batch: every clone observes the cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns why the deadline no longer admits work, if it doesn't.
    #[must_use]
    pub fn check(&self) -> Option<Expiry> {
        if self.token.is_cancelled() {
            Some(Expiry::Cancelled)
        } else if Instant::now() >= self.expires_at {
            Some(Expiry::Elapsed)
        } else {
            None
        }
    }

    /// Completes when the deadline elapses or the batch is cancelled.
    pub async fn expired(&self) -> Expiry {
        tokio::select! {
            biased;
            () = self.token.cancelled() => Expiry::Cancelled,
            () = tokio::time::sleep_until(self.expires_at) => Expiry::Elapsed,
        }
    }

    /// Runs `operation` unless the deadline fires first.
    ///
    /// Expiry is checked before `operation` is polled, so nothing new starts
    /// once the deadline has passed. When the deadline wins, `operation` is
    /// dropped, which aborts any request or write it had in flight.
    ///
    /// # Errors
    ///
    /// Returns the error of `operation`, or [`DownloadError::DeadlineExceeded`] /
    /// [`DownloadError::Cancelled`] for `url` when the deadline fires first.
    pub async fn guard<T, F>(&self, url: &str, operation: F) -> Result<T, DownloadError>
    where
        F: Future<Output = Result<T, DownloadError>>,
    {
        tokio::select! {
            biased;
            expiry = self.expired() => Err(expiry.into_error(url)),
            result = operation => result,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_test::{assert_pending, assert_ready_eq};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_check_reports_elapsed_after_expiry() {
        let deadline = BatchDeadline::after(Duration::from_secs(5));
        assert_eq!(deadline.check(), None);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(deadline.check(), Some(Expiry::Elapsed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_shared_between_clones() {
        let deadline = BatchDeadline::after(Duration::from_secs(60));
        let clone = deadline.clone();

        let mut waiting = tokio_test::task::spawn(clone.expired());
        assert_pending!(waiting.poll());

        deadline.cancel();
        assert!(clone.is_cancelled());
        assert!(waiting.is_woken());
        assert_ready_eq!(waiting.poll(), Expiry::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_wins_over_elapsed() {
        let deadline = BatchDeadline::after(Duration::from_secs(1));
        tokio::time::advance(Duration::from_secs(2)).await;
        deadline.cancel();
        assert_eq!(deadline.check(), Some(Expiry::Cancelled));
        assert_eq!(deadline.expired().await, Expiry::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_returns_operation_result_before_expiry() {
        let deadline = BatchDeadline::after(Duration::from_secs(10));
        let value = deadline.guard("https://x/a.png", async { Ok(7) }).await;
        assert_eq!(value.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_aborts_slow_operation_on_expiry() {
        let deadline = BatchDeadline::after(Duration::from_secs(1));
        let result = deadline
            .guard("https://x/slow.png", async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            })
            .await;
        assert!(matches!(
            result,
            Err(DownloadError::DeadlineExceeded { ref url }) if url == "https://x/slow.png"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_does_not_start_after_cancellation() {
        let deadline = BatchDeadline::after(Duration::from_secs(10));
        deadline.cancel();

        let started = std::sync::atomic::AtomicBool::new(false);
        let result = deadline
            .guard("https://x/a.png", async {
                started.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(DownloadError::Cancelled { .. })));
        assert!(!started.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_after_saturates_huge_durations() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        runtime.block_on(async {
            let deadline = BatchDeadline::after(Duration::MAX);
            assert!(deadline.expires_at() > Instant::now());
        });
    }
}
