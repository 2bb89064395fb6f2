//! Bounded-concurrency batch downloads streamed to disk.
//!
//! This module turns a list of source URLs into one [`DownloadOutcome`] per
//! input, fetching at most `concurrency` of them at a time and bounding the
//! whole batch by one shared [`BatchDeadline`].
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Filenames derived from the last path segment of the URL
//! - Skip-existing support for resumable batches
//! - Order-preserving results independent of completion order
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::download::download_to_dir;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let urls = vec!["https://example.com/cat.png".to_string()];
//! for outcome in download_to_dir(&urls, "./downloads").await? {
//!     println!("{} -> {:?}", outcome.url, outcome.path);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod constants;
mod deadline;
mod engine;
mod error;
mod filename;
mod outcome;
mod transport;
mod worker;

pub use client::HttpClient;
pub use config::DownloadConfig;
pub use constants::{
    DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT, MAX_CONCURRENCY, MIN_CONCURRENCY,
};
pub use deadline::{BatchDeadline, Expiry};
pub use engine::{DownloadEngine, DownloadStats, download_all, download_to_dir};
pub use error::{DownloadError, EngineError, FailureKind};
pub use filename::filename_from_url;
pub use outcome::DownloadOutcome;
pub use transport::{BodyStream, Transport, TransportResponse};
pub use worker::{process_item, transfer};
