//! Error types for the download module.
//!
//! A [`DownloadError`] never escapes a single document: the manager logs it and
//! reports [`super::DownloadOutcome::Failed`].

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::TransportError;

/// Errors that can occur while downloading one document.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request failed or returned a non-2xx status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body stream broke mid-transfer.
    #[error("stream interrupted downloading {url}: {source}")]
    Stream {
        /// The URL being downloaded.
        url: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The response content type is not an accepted document type.
    #[error("unexpected content type {content_type:?} downloading {url}")]
    UnexpectedContentType {
        /// The URL being downloaded.
        url: String,
        /// The `Content-Type` header, if any.
        content_type: Option<String>,
    },

    /// The server answered 2xx with an empty body.
    #[error("empty response body downloading {url}")]
    EmptyBody {
        /// The URL being downloaded.
        url: String,
    },

    /// File system error creating, writing or renaming the file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a stream error.
    pub fn stream(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Stream {
            url: url.into(),
            source,
        }
    }

    /// Creates an unexpected content type error.
    pub fn unexpected_content_type(url: impl Into<String>, content_type: Option<&str>) -> Self {
        Self::UnexpectedContentType {
            url: url.into(),
            content_type: content_type.map(ToString::to_string),
        }
    }

    /// Creates an empty body error.
    pub fn empty_body(url: impl Into<String>) -> Self {
        Self::EmptyBody { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_content_type_display() {
        let error = DownloadError::unexpected_content_type(
            "https://kgis.example/a.pdf",
            Some("text/html; charset=utf-8"),
        );
        let msg = error.to_string();
        assert!(msg.contains("text/html"), "Expected content type in: {msg}");
        assert!(msg.contains("https://kgis.example/a.pdf"));
    }

    #[test]
    fn test_download_error_missing_content_type_display() {
        let error = DownloadError::unexpected_content_type("https://kgis.example/a.pdf", None);
        assert!(error.to_string().contains("None"));
    }

    #[test]
    fn test_download_error_io_display() {
        let error = DownloadError::io(
            "/archive/a.pdf",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = error.to_string();
        assert!(msg.contains("/archive/a.pdf"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_download_error_transport_is_transparent() {
        let error = DownloadError::from(TransportError::http_status("https://x.example/a", 404));
        assert_eq!(error.to_string(), "HTTP 404 requesting https://x.example/a");
    }
}
