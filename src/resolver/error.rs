//! Error types for document URL resolution.
//!
//! Messages follow a What/Why/Fix layout so a single log line tells the
//! operator what to check.

use thiserror::Error;

use crate::fetch::TransportError;
use crate::render::RenderError;

/// Errors raised while turning a token or a page into document URLs.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The exchange or page request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The browser could not render the page.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The response held no document link.
    #[error("no {pattern} found in response from {url}\n  Suggestion: {suggestion}")]
    NoMatch {
        /// URL whose response was scanned.
        url: String,
        /// What was looked for.
        pattern: &'static str,
        /// How to fix the issue.
        suggestion: &'static str,
    },

    /// A link was found but could not be turned into an absolute URL.
    #[error("cannot resolve link '{link}' against '{base}'")]
    Decode {
        /// The extracted link.
        link: String,
        /// Base URL it was resolved against.
        base: String,
    },
}

impl ResolveError {
    /// Creates a `NoMatch` error for an exchange page without a PDF frame.
    #[must_use]
    pub fn no_pdf_frame(url: &str) -> Self {
        Self::NoMatch {
            url: url.to_string(),
            pattern: "PDF iframe",
            suggestion: "The token may be expired or the session stale; rerun to retry",
        }
    }

    /// Creates a `Decode` error.
    #[must_use]
    pub fn decode(link: &str, base: &str) -> Self {
        Self::Decode {
            link: link.to_string(),
            base: base.to_string(),
        }
    }
}
