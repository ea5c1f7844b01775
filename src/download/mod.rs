//! Idempotent streamed document downloads.
//!
//! Every document has a deterministic destination (see [`filename`]); a file at
//! that path means the document is done. Bodies stream to a `.part` sibling
//! that is renamed into place only after a complete, non-empty transfer, so a
//! destination never holds partial data.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use manual_downloader::download::{ContentTypePolicy, DownloadOutcome, download};
//! use manual_downloader::fetch::Fetcher;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(Duration::from_secs(30))?;
//! let outcome = download(
//!     &fetcher,
//!     "https://example.com/manual.pdf",
//!     Path::new("./PDFs/manual.pdf"),
//!     ContentTypePolicy::Strict,
//!     Duration::from_secs(900),
//! )
//! .await;
//! if let DownloadOutcome::Downloaded(bytes) = outcome {
//!     println!("{bytes} bytes");
//! }
//! # Ok(())
//! # }
//! ```

mod constants;
mod error;
pub mod filename;
mod manager;

pub use constants::{ACCEPTED_STATIC_CONTENT_TYPES, PART_SUFFIX, WRITE_BUFFER_SIZE};
pub use error::DownloadError;
pub use filename::{
    model_document_path, sanitize_model_name, sanitize_pdf_name, sanitize_static_name,
    static_document_path,
};
pub use manager::{ContentTypePolicy, DownloadOutcome, download, try_download};

// Note: no module-local Result aliases; use `Result<T, DownloadError>` explicitly.
