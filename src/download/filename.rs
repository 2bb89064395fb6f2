//! Filename derivation for downloads.
//!
//! The destination name is taken from the identifier text alone, with no
//! network or filesystem access, so the skip-existing check can run before
//! any request is made.

use super::constants::{DEFAULT_EXTENSION, FALLBACK_FILENAME};

/// Derives the destination filename for a source URL.
///
/// 1. Take the last `/`-separated segment.
/// 2. Drop everything from the first `?` onward.
/// 3. Append `.jpg` when the remaining name has no `.`.
///
/// When nothing is left after step 2 (trailing slash, bare query string) the
/// fixed name `unknown.jpg` is used.
///
/// Separators other than `/` and `..` segments are not rewritten; callers
/// feeding untrusted identifiers must sanitize them first.
///
/// # Example
///
/// ```
/// use harvester_core::filename_from_url;
///
/// assert_eq!(filename_from_url("https://x/y/img.png?w=100"), "img.png");
/// assert_eq!(filename_from_url("https://x/y/noext"), "noext.jpg");
/// assert_eq!(filename_from_url("plainname"), "plainname.jpg");
/// ```
#[must_use]
pub fn filename_from_url(url: &str) -> String {
    let last_segment = url.rsplit('/').next().unwrap_or_default();
    let name = last_segment
        .split_once('?')
        .map_or(last_segment, |(before, _)| before);

    if name.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    if name.contains('.') {
        name.to_string()
    } else {
        format!("{name}{DEFAULT_EXTENSION}")
    }
}
