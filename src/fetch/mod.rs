//! Content fetching: one HTTP exchange at a time over a shared cookie session.
//!
//! - [`Fetcher`] - reqwest client + cookie jar, the run's session handle
//! - [`TransportError`] - network, timeout and status failures

mod client;
mod error;

pub use client::Fetcher;
pub use error::TransportError;
