//! CLI output formatting for finished batches.

use anyhow::{Context, Result};
use harvester_core::DownloadOutcome;

/// Message when no input was provided at all.
pub(crate) const NO_INPUT_GUIDANCE: &str =
    "No input provided. Pass URLs as arguments, use --input-file, or pipe them via stdin.";

/// Example for piping input.
pub(crate) const INPUT_PIPE_EXAMPLE: &str =
    "Example: echo 'https://example.com/cat.png' | harvester -o ./cats";

/// Renders the outcome list as a pretty-printed JSON array.
pub(crate) fn render_json(outcomes: &[DownloadOutcome]) -> Result<String> {
    serde_json::to_string_pretty(outcomes).context("Failed to serialize outcomes")
}

/// Renders the human-readable summary: one line per failure, then the totals.
pub(crate) fn render_summary(outcomes: &[DownloadOutcome]) -> String {
    let mut lines = Vec::new();
    let mut downloaded = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for outcome in outcomes {
        match (&outcome.error, outcome.skipped) {
            (Some(error), _) => {
                failed += 1;
                let url = if outcome.url.is_empty() {
                    "<empty>"
                } else {
                    outcome.url.as_str()
                };
                lines.push(format!("FAILED {url}: {error}"));
            }
            (None, true) => skipped += 1,
            (None, false) => downloaded += 1,
        }
    }

    lines.push(format!(
        "{downloaded} downloaded, {skipped} skipped, {failed} failed ({} total)",
        outcomes.len()
    ));
    lines.join("\n")
}
