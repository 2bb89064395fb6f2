//! Harvester Core Library
//!
//! This library provides the core functionality for the harvester tool,
//! which fetches a list of remote files into a local directory with a fixed
//! cap on simultaneous transfers and reports one outcome per input.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`download`] - Batch orchestration, transfer worker, HTTP transport
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::{DownloadConfig, download_all};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let urls = vec!["https://example.com/cat.png".to_string()];
//! let outcomes = download_all(&urls, DownloadConfig::for_output_dir("./cats")).await?;
//! for outcome in &outcomes {
//!     println!("{}: {}", outcome.url, outcome.success);
//! }
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
#[cfg(test)]
mod test_support;
mod user_agent;

// Re-export commonly used types
pub use download::{
    BatchDeadline, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT, DownloadConfig,
    DownloadEngine, DownloadError, DownloadOutcome, DownloadStats, EngineError, FailureKind,
    HttpClient, Transport, TransportResponse, download_all, download_to_dir, filename_from_url,
};
pub use user_agent::CLIENT_USER_AGENT;
