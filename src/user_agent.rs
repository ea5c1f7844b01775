//! User-Agent strings and the browser fingerprint replayed against the tech-info portal.
//!
//! Gateway, session and document traffic identifies the tool. The token exchange
//! is the one call that must look like the browser flow it replays, because the
//! portal checks origin, referer and user-agent before handing out the viewer page.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

/// Desktop Chrome User-Agent observed in the owner portal flow.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36";

/// Default User-Agent for gateway, session and download requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("manual-downloader/{version}")
}

/// Header set reproducing a cross-site form navigation from the owner portal.
///
/// Values are plain strings so they can be overridden from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrowserFingerprint {
    /// Site that initiates the exchange (`origin` header).
    pub origin: String,
    /// Page the exchange claims to come from (`referer` header).
    pub referer: String,
    /// Browser User-Agent.
    pub user_agent: String,
    /// Client hint brand list (`sec-ch-ua`).
    pub sec_ch_ua: String,
    /// Client hint platform (`sec-ch-ua-platform`).
    pub sec_ch_ua_platform: String,
    /// Preferred languages.
    pub accept_language: String,
}

impl Default for BrowserFingerprint {
    fn default() -> Self {
        Self {
            origin: "https://owners.kia.com".to_string(),
            referer: "https://owners.kia.com/".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            sec_ch_ua: r#""Google Chrome";v="141", "Not?A_Brand";v="8", "Chromium";v="141""#
                .to_string(),
            sec_ch_ua_platform: r#""Windows""#.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

impl BrowserFingerprint {
    /// Builds the full header map sent with the token exchange form POST.
    ///
    /// Values that are not valid header text are dropped rather than failing
    /// the exchange; the portal will reject the request on its own if a
    /// required header is missing.
    #[must_use]
    pub fn headers(&self) -> HeaderMap {
        let entries: [(&'static str, &str); 17] = [
            (
                "accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,\
                 image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
            ),
            ("accept-language", &self.accept_language),
            ("cache-control", "max-age=0"),
            ("content-type", "application/x-www-form-urlencoded"),
            ("dnt", "1"),
            ("origin", &self.origin),
            ("priority", "u=0, i"),
            ("referer", &self.referer),
            ("sec-ch-ua", &self.sec_ch_ua),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", &self.sec_ch_ua_platform),
            ("sec-fetch-dest", "document"),
            ("sec-fetch-mode", "navigate"),
            ("sec-fetch-site", "cross-site"),
            ("sec-fetch-user", "?1"),
            ("upgrade-insecure-requests", "1"),
            ("user-agent", &self.user_agent),
        ];

        let mut headers = HeaderMap::with_capacity(entries.len());
        for (name, value) in entries {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(HeaderName::from_static(name), value);
            }
        }
        headers
    }
}
