//! Download manager: skip-if-present, stream to `.part`, verify, rename.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, instrument};

use super::constants::{ACCEPTED_STATIC_CONTENT_TYPES, PART_SUFFIX, WRITE_BUFFER_SIZE};
use super::error::DownloadError;
use crate::fetch::Fetcher;

/// How much to trust the server's `Content-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTypePolicy {
    /// Require a PDF or generic binary content type.
    Strict,
    /// Accept whatever the server sends; the URL already came from a PDF frame.
    Trust,
}

impl ContentTypePolicy {
    /// Returns true if a response with `content_type` may be saved.
    #[must_use]
    pub fn accepts(self, content_type: Option<&str>) -> bool {
        match self {
            Self::Trust => true,
            Self::Strict => content_type.is_some_and(|value| {
                let mime = value.split(';').next().unwrap_or("").trim();
                ACCEPTED_STATIC_CONTENT_TYPES
                    .iter()
                    .any(|accepted| mime.eq_ignore_ascii_case(accepted))
            }),
        }
    }
}

/// Result of one download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The destination already existed; nothing was requested.
    Skipped,
    /// The document was saved; carries the byte count.
    Downloaded(u64),
    /// The attempt failed and left nothing at the destination.
    Failed,
}

/// Downloads `url` to `destination`, logging any failure.
///
/// Never returns an error: failures are logged with the URL and reported as
/// [`DownloadOutcome::Failed`].
pub async fn download(
    fetcher: &Fetcher,
    url: &str,
    destination: &Path,
    policy: ContentTypePolicy,
    timeout: Duration,
) -> DownloadOutcome {
    match try_download(fetcher, url, destination, policy, timeout).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(
                url,
                path = %destination.display(),
                stage = "download",
                error = %e,
                "download failed"
            );
            DownloadOutcome::Failed
        }
    }
}

/// Downloads `url` to `destination`.
///
/// Returns [`DownloadOutcome::Skipped`] without any request when the
/// destination exists. Otherwise the body streams into `<destination>.part`,
/// which is renamed onto the destination only after a non-empty transfer.
///
/// # Errors
///
/// Returns [`DownloadError`] on request failure, non-2xx status, rejected
/// content type, empty body, or any file system error. The part file is
/// removed in every error case.
#[instrument(level = "debug", skip(fetcher, timeout), fields(path = %destination.display()))]
pub async fn try_download(
    fetcher: &Fetcher,
    url: &str,
    destination: &Path,
    policy: ContentTypePolicy,
    timeout: Duration,
) -> Result<DownloadOutcome, DownloadError> {
    if tokio::fs::try_exists(destination).await.unwrap_or(false) {
        info!(path = %destination.display(), "already downloaded; skipping");
        return Ok(DownloadOutcome::Skipped);
    }

    let response = fetcher.get_streaming(url, timeout).await?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    if !policy.accepts(content_type.as_deref()) {
        return Err(DownloadError::unexpected_content_type(
            url,
            content_type.as_deref(),
        ));
    }

    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::io(parent, e))?;
    }

    let part_path = part_path(destination);
    let written = match stream_to_file(response, url, &part_path).await {
        Ok(0) => Err(DownloadError::empty_body(url)),
        Ok(bytes) => Ok(bytes),
        Err(e) => Err(e),
    };
    let bytes = match written {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %part_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(&part_path, destination).await {
        let _ = tokio::fs::remove_file(&part_path).await;
        return Err(DownloadError::io(destination, e));
    }

    info!(path = %destination.display(), bytes, "download complete");
    Ok(DownloadOutcome::Downloaded(bytes))
}

/// `<destination>.part`, next to the destination.
fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// Streams the response body to `file_path`, returning bytes written.
///
/// Extracted so the caller can clean up on error.
async fn stream_to_file(
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let file = File::create(file_path)
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::stream(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
