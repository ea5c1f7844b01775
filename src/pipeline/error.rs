//! Errors that abort a whole run.

use thiserror::Error;

use crate::fetch::TransportError;
use crate::render::RenderError;

/// Errors that stop the pipeline. Everything else is logged per item.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The gateway returned no usable models, so there is nothing to resolve.
    #[error(
        "vehicle catalog from {gateway_url} is empty or unreachable\n  Suggestion: Check network access to the owner portal and the gateway URL in the config"
    )]
    EmptyCatalog {
        /// Gateway URL that was queried.
        gateway_url: String,
    },

    /// The shared HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] TransportError),

    /// The configured WebDriver renderer could not be set up.
    #[error(transparent)]
    Renderer(#[from] RenderError),
}
