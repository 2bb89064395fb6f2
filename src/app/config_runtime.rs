//! Merges CLI arguments, the config file and built-in defaults.
//!
//! Precedence: values given on the command line, then the config file, then
//! the clap defaults.

use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use harvester_core::DownloadConfig;

use crate::app_config::FileConfig;
use crate::cli::Args;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) output_dir: bool,
    pub(crate) concurrency: bool,
    pub(crate) timeout_secs: bool,
    pub(crate) no_skip_existing: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    (args, sources_from_matches(&matches))
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        output_dir: is_commandline_value(matches, "output_dir"),
        concurrency: is_commandline_value(matches, "concurrency"),
        timeout_secs: is_commandline_value(matches, "timeout_secs"),
        no_skip_existing: is_commandline_value(matches, "no_skip_existing"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Builds the engine configuration for this run.
///
/// Per-item reporting is on by default, off under `--quiet`, and otherwise
/// follows the file's `verbose` key unless `-v` was given.
pub(crate) fn resolve_download_config(
    args: &Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> DownloadConfig {
    let file = file_config.cloned().unwrap_or_default();

    let output_dir = match file.output_dir {
        Some(dir) if !cli_sources.output_dir => dir,
        _ => args.output_dir.clone(),
    };

    let concurrency = match file.concurrency {
        Some(concurrency) if !cli_sources.concurrency => concurrency,
        _ => args.concurrency,
    };

    let timeout_secs = match file.timeout_secs {
        Some(timeout_secs) if !cli_sources.timeout_secs => timeout_secs,
        _ => args.timeout_secs,
    };

    let skip_existing = if cli_sources.no_skip_existing {
        false
    } else {
        file.skip_existing.unwrap_or(true)
    };

    let verbose = if args.quiet {
        false
    } else if cli_sources.verbose {
        true
    } else {
        file.verbose.unwrap_or(true)
    };

    DownloadConfig {
        concurrency: usize::from(concurrency),
        timeout: Duration::from_secs(timeout_secs),
        output_dir,
        skip_existing,
        verbose,
    }
}
