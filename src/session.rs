//! Tech-info session refresh.
//!
//! The portal ties its anti-forgery state to fresh cookies, so a priming GET to
//! the portal root must run right before every token exchange. A failed refresh
//! is logged and ignored: the exchange that follows fails on its own if the
//! session really is unusable.

use std::time::Duration;

use tracing::{error, info, instrument};

use crate::fetch::Fetcher;

/// Issues the priming GET that refreshes the session cookies held by `fetcher`.
#[instrument(level = "debug", skip(fetcher, timeout))]
pub async fn refresh(fetcher: &Fetcher, base_url: &str, timeout: Duration) {
    info!(base_url, "refreshing tech-info session");
    match fetcher.get_text(base_url, timeout).await {
        Ok(_) => info!(base_url, "session refresh completed"),
        Err(e) => error!(base_url, error = %e, "session refresh failed; continuing"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_swallows_invalid_base_url() {
        let fetcher = Fetcher::new(Duration::from_secs(1)).unwrap();
        refresh(&fetcher, "not a url", Duration::from_secs(1)).await;
        assert!(fetcher.cookies_for("https://portal.example/").is_none());
    }
}
