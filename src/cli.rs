//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use harvester_core::download::{DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT};

/// Download a list of files into a local directory.
///
/// Harvester fetches every URL with a fixed cap on simultaneous transfers,
/// names each file after the last path segment of its URL, and reports one
/// result per input in input order.
#[derive(Parser, Debug, Clone)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// URLs to download (read from --input-file or stdin when omitted)
    pub urls: Vec<String>,

    /// Read URLs from a file, one per line (# starts a comment)
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Directory receiving the downloaded files
    #[arg(short = 'o', long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Per-item timeout in seconds; the batch deadline is a multiple of it (1-3600)
    #[arg(short = 't', long = "timeout", value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout_secs: u64,

    /// Re-download files that already exist in the output directory
    #[arg(long)]
    pub no_skip_existing: bool,

    /// Print the outcome list as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
