//! Assembly of the URL list from positional arguments, an input file or stdin.

use std::fs;
use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};

use crate::cli::Args;

/// Collects the batch input.
///
/// Positional URLs are taken verbatim. Otherwise the input file, or piped
/// stdin, is read line by line with [`parse_url_lines`]. An interactive stdin
/// with no other input yields an empty list.
pub(crate) fn collect_urls(args: &Args) -> Result<Vec<String>> {
    if !args.urls.is_empty() {
        return Ok(args.urls.clone());
    }

    if let Some(path) = &args.input_file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{}'", path.display()))?;
        return Ok(parse_url_lines(&raw));
    }

    if io::stdin().is_terminal() {
        return Ok(Vec::new());
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read URLs from stdin")?;
    Ok(parse_url_lines(&buffer))
}

/// One URL per non-blank line; lines starting with `#` are comments.
pub(crate) fn parse_url_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}
