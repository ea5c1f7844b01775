//! Static page scraping: quoted `/FileServerRoot/...pdf` paths embedded in the
//! page markup or its inline scripts.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use super::ResolveError;
use super::utils::compile_static_regex;
use crate::catalog::PageTarget;
use crate::fetch::Fetcher;
use crate::render::PageRenderer;

/// Single-quoted `/FileServerRoot` path ending in `.pdf`, any case.
static FILE_SERVER_PDF_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"'(/FileServerRoot[^']+\.(?i:pdf))'"));

/// Returns every quoted `/FileServerRoot/...pdf` path in `html`, without
/// quotes, in first-seen order, de-duplicated.
#[must_use]
pub fn extract_static_pdf_paths(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    FILE_SERVER_PDF_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|path| seen.insert(*path))
        .map(ToString::to_string)
        .collect()
}

/// Loads a page's markup, through the browser when a renderer is configured.
///
/// # Errors
///
/// Returns [`ResolveError::Render`] or [`ResolveError::Transport`] when the
/// page cannot be loaded.
#[instrument(level = "debug", skip(fetcher, renderer, timeout), fields(page = %page))]
pub async fn load_page_html(
    fetcher: &Fetcher,
    renderer: Option<&dyn PageRenderer>,
    page: &PageTarget,
    timeout: std::time::Duration,
) -> Result<String, ResolveError> {
    let html = match renderer {
        Some(renderer) => renderer.render(&page.url).await?,
        None => fetcher.get_text(&page.url, timeout).await?,
    };
    debug!(bytes = html.len(), rendered = renderer.is_some(), "page loaded");
    Ok(html)
}
