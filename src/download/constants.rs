//! Constants for the download module (defaults, limits, timeouts).

use std::time::Duration;

/// Default number of simultaneous transfers.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;

/// Default per-item timeout used to size the batch deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./downloads";

/// HTTP connect timeout (30 seconds). The batch deadline bounds everything else.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Extension appended to names that have none.
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Name used when no path segment can be taken from a URL.
pub const FALLBACK_FILENAME: &str = "unknown.jpg";
