//! Document URL resolution.
//!
//! Two sources produce downloadable URLs:
//!
//! - [`token_exchange`] - form-POSTs one access token to the tech-info portal
//!   and reads the PDF link out of the returned viewer frame
//! - [`static_page`] - scans a static page (plain or browser-rendered) for
//!   quoted `/FileServerRoot/...pdf` paths
//!
//! Fallible entry points return [`ResolveError`]; [`resolve_token_url`] is the
//! logging wrapper the pipeline uses so one bad token never stops a run.

mod error;
pub mod static_page;
pub mod token_exchange;
mod utils;

pub use error::ResolveError;
pub use static_page::{extract_static_pdf_paths, load_page_html};
pub use token_exchange::{exchange_token, extract_pdf_frame_link, resolve_token_url};
pub use utils::absolutize_url;

use crate::catalog::Target;

/// A concrete document URL tied to the target that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// Absolute document URL.
    pub url: String,
    /// Target the document belongs to.
    pub target: Target,
    /// 1-based position of the token (or page link) within its target.
    pub ordinal: usize,
}
