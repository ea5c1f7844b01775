//! Token exchange: trades one access token for the viewer page and pulls the
//! PDF link out of its frame.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error, instrument};

use super::ResolveError;
use super::utils::{absolutize_url, compile_static_regex};
use crate::catalog::{AccessToken, ModelTarget};
use crate::config::{Endpoints, Timeouts};
use crate::fetch::Fetcher;
use crate::user_agent::BrowserFingerprint;

/// First `src`/`href` of an `<iframe>` or `<frame>` whose value ends in `.pdf`.
static PDF_FRAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<i?frame\b[^>]*?\s(?:src|href)\s*=\s*["']([^"']+?\.pdf)["']"#)
});

/// Returns the raw PDF link of the first matching frame tag in `html`.
#[must_use]
pub fn extract_pdf_frame_link(html: &str) -> Option<&str> {
    PDF_FRAME_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Exchanges `token` for the absolute URL of its PDF.
///
/// # Errors
///
/// Returns [`ResolveError::Transport`] if the form POST fails,
/// [`ResolveError::NoMatch`] if the page has no PDF frame, and
/// [`ResolveError::Decode`] if the link cannot be absolutized.
#[instrument(level = "debug", skip_all)]
pub async fn exchange_token(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    fingerprint: &BrowserFingerprint,
    timeouts: &Timeouts,
    token: &AccessToken,
) -> Result<String, ResolveError> {
    let html = fetcher
        .post_form(
            &endpoints.token_exchange_url,
            fingerprint.headers(),
            &[("token", token.as_str())],
            timeouts.session,
        )
        .await?;
    debug!(bytes = html.len(), "exchange page received");

    let link = extract_pdf_frame_link(&html)
        .ok_or_else(|| ResolveError::no_pdf_frame(&endpoints.token_exchange_url))?;
    absolutize_url(link, &endpoints.tech_info_base_url)
}

/// Exchanges `token` for its PDF URL, logging failures against `target`.
///
/// `ordinal` is the token's 1-based position within the target and only
/// labels log lines.
pub async fn resolve_token_url(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    fingerprint: &BrowserFingerprint,
    timeouts: &Timeouts,
    token: &AccessToken,
    target: &ModelTarget,
    ordinal: usize,
) -> Option<String> {
    match exchange_token(fetcher, endpoints, fingerprint, timeouts, token).await {
        Ok(url) => {
            debug!(model = %target, ordinal, url, "token resolved");
            Some(url)
        }
        Err(e) => {
            error!(
                model = %target,
                ordinal,
                stage = "resolve",
                error = %e,
                "failed to extract PDF link from token exchange"
            );
            None
        }
    }
}
