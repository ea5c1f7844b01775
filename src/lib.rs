//! Manual Downloader Core Library
//!
//! Retrieves vehicle manual PDFs from a session-gated owner portal and from a
//! set of static tech-info pages, and files them into a deterministic local
//! archive where an existing file means "already downloaded".
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Cookie-carrying HTTP client shared by every stage
//! - [`session`] - Priming GET that refreshes portal cookies
//! - [`catalog`] - Vehicle model and access token discovery, static page list
//! - [`resolver`] - Token exchange and static page link extraction
//! - [`render`] - Browser rendering through a WebDriver endpoint
//! - [`download`] - Idempotent streamed downloads and filename derivation
//! - [`pipeline`] - Run orchestration and summary
//! - [`config`] - Endpoints, timeouts and static page defaults

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod download;
pub mod fetch;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod session;
pub mod user_agent;

// Re-export commonly used types
pub use catalog::{AccessToken, ModelTarget, PageTarget, Target};
pub use config::{Endpoints, PipelineConfig, RenderSettings, Timeouts};
pub use download::{ContentTypePolicy, DownloadError, DownloadOutcome};
pub use fetch::{Fetcher, TransportError};
pub use pipeline::{Mode, Pipeline, PipelineError, RunSummary};
pub use render::{PageRenderer, RenderError, WebDriverRenderer};
pub use resolver::{ResolveError, ResolvedDocument};
pub use user_agent::BrowserFingerprint;
