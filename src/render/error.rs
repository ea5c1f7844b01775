//! Errors raised while rendering a page through a browser.

use thiserror::Error;

/// Errors raised by a [`super::PageRenderer`].
#[derive(Debug, Error)]
pub enum RenderError {
    /// The WebDriver endpoint could not be reached or timed out.
    #[error("WebDriver {command} request failed: {source}")]
    Http {
        /// WebDriver command being issued.
        command: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The WebDriver endpoint returned a non-2xx status without an error body.
    #[error("WebDriver {command} returned HTTP {status}")]
    HttpStatus {
        /// WebDriver command being issued.
        command: &'static str,
        /// The HTTP status code.
        status: u16,
    },

    /// The WebDriver endpoint reported a protocol error.
    #[error("WebDriver {command} error {error}: {message}")]
    Protocol {
        /// WebDriver command being issued.
        command: &'static str,
        /// W3C error code, e.g. `session not created`.
        error: String,
        /// Human-readable message from the driver.
        message: String,
    },

    /// The response was not JSON or lacked an expected field.
    #[error("WebDriver {command} response malformed: {detail}")]
    Malformed {
        /// WebDriver command being issued.
        command: &'static str,
        /// What was wrong with the response.
        detail: String,
    },

    /// The renderer's HTTP client could not be constructed.
    #[error("failed to build WebDriver client: {source}")]
    ClientBuild {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint URL is not an absolute http(s) URL.
    #[error("invalid WebDriver endpoint: {endpoint}")]
    InvalidEndpoint {
        /// The rejected endpoint string.
        endpoint: String,
    },
}

impl RenderError {
    /// Creates a request failure for `command`.
    pub fn http(command: &'static str, source: reqwest::Error) -> Self {
        Self::Http { command, source }
    }

    /// Creates a malformed-response error for `command`.
    pub fn malformed(command: &'static str, detail: impl Into<String>) -> Self {
        Self::Malformed {
            command,
            detail: detail.into(),
        }
    }
}
