//! Per-item download procedure.
//!
//! [`process_item`] performs the input checks and skip-existing logic for one
//! identifier; [`transfer`] fetches it and streams the payload to disk. Every
//! suspension point is guarded by the shared [`BatchDeadline`].

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::instrument;

use super::config::DownloadConfig;
use super::deadline::BatchDeadline;
use super::error::DownloadError;
use super::filename::filename_from_url;
use super::outcome::DownloadOutcome;
use super::transport::{BodyStream, Transport};
use crate::user_agent::CLIENT_USER_AGENT;

/// HTTP 200 OK; every other status is a failure.
const STATUS_OK: u16 = 200;

/// Emits a terminal-state event at `$level` when verbose, at `debug` otherwise.
macro_rules! report {
    ($verbose:expr, $level:ident, $($arg:tt)+) => {
        if $verbose {
            tracing::$level!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Destination for `url` inside `output_dir`, `None` for an empty identifier.
#[must_use]
pub(crate) fn destination_for(output_dir: &Path, url: &str) -> Option<PathBuf> {
    (!url.is_empty()).then(|| output_dir.join(filename_from_url(url)))
}

/// Runs the full per-item procedure for one identifier.
///
/// Empty identifiers fail without I/O. With `skip_existing`, an existing file
/// at the derived path counts as success and is left untouched; its content
/// is not verified.
#[instrument(level = "debug", skip(transport, deadline, config), fields(url = %url))]
pub async fn process_item(
    transport: &dyn Transport,
    deadline: &BatchDeadline,
    config: &DownloadConfig,
    url: &str,
) -> DownloadOutcome {
    let Some(path) = destination_for(&config.output_dir, url) else {
        report!(config.verbose, warn, "skipping empty URL");
        return DownloadOutcome::failed(url, None, DownloadError::EmptyUrl);
    };

    if config.skip_existing && tokio::fs::try_exists(&path).await.unwrap_or(false) {
        report!(
            config.verbose,
            info,
            url,
            path = %path.display(),
            "skipping download: file already exists"
        );
        return DownloadOutcome::skipped(url, path);
    }

    transfer(transport, deadline, url, &path, config.verbose).await
}

/// Fetches `url` and writes the payload to `path`.
///
/// Non-200 responses leave no file behind. A transfer that fails after the
/// destination was created removes the partial file; a failure before that
/// point leaves any existing file at `path` untouched.
pub async fn transfer(
    transport: &dyn Transport,
    deadline: &BatchDeadline,
    url: &str,
    path: &Path,
    verbose: bool,
) -> DownloadOutcome {
    match fetch_to_file(transport, deadline, url, path).await {
        Ok(bytes_written) => {
            report!(
                verbose,
                info,
                url,
                path = %path.display(),
                bytes = bytes_written,
                "download complete"
            );
            DownloadOutcome::downloaded(url, path.to_path_buf(), bytes_written)
        }
        Err(error) => {
            report!(
                verbose,
                warn,
                url,
                path = %path.display(),
                kind = ?error.kind(),
                error = %error,
                "download failed"
            );
            DownloadOutcome::failed(url, Some(path.to_path_buf()), error)
        }
    }
}

async fn fetch_to_file(
    transport: &dyn Transport,
    deadline: &BatchDeadline,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let response = deadline
        .guard(url, transport.get(url, CLIENT_USER_AGENT))
        .await?;

    if response.status != STATUS_OK {
        return Err(DownloadError::http_status(url, response.status));
    }

    let file = deadline
        .guard(url, async {
            File::create(path)
                .await
                .map_err(|e| DownloadError::create_file(path, e))
        })
        .await?;

    let result = write_body(file, response.body, deadline, url, path).await;
    if result.is_err() {
        tracing::debug!(path = %path.display(), "cleaning up partial file after error");
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

/// Streams `body` into the freshly created `file`, returning bytes written.
async fn write_body(
    file: File,
    mut body: BodyStream,
    deadline: &BatchDeadline,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = deadline
        .guard(url, async { Ok::<_, DownloadError>(body.next().await) })
        .await?
    {
        let chunk = chunk?;
        deadline
            .guard(url, async {
                writer
                    .write_all(&chunk)
                    .await
                    .map_err(|e| DownloadError::write(path, e))
            })
            .await?;
        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    deadline
        .guard(url, async {
            writer
                .flush()
                .await
                .map_err(|e| DownloadError::write(path, e))
        })
        .await?;

    Ok(bytes_written)
}
