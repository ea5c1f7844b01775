//! Immutable pipeline configuration: portal endpoints, timeouts, static pages.
//!
//! Everything the pipeline talks to is described here and handed to the
//! components at construction time. Defaults reproduce the live portal flow.

use std::path::PathBuf;
use std::time::Duration;

use crate::user_agent::BrowserFingerprint;

/// Default archive root.
pub const DEFAULT_OUTPUT_DIR: &str = "PDFs";

/// Sub-directory of the archive root that holds static-page documents.
pub const STATIC_SUBDIR: &str = "KGIS_Static";

/// Owner portal API gateway used for model and token lookups.
pub const DEFAULT_GATEWAY_URL: &str =
    "https://owners.kia.com/apps/services/owners/apigwServlet.html";

/// Tech-info portal root; priming GET target and base for resolved links.
pub const DEFAULT_TECH_INFO_BASE_URL: &str = "https://www.kiatechinfo.com";

/// Path of the token exchange page below the tech-info root.
pub const TOKEN_EXCHANGE_PATH: &str = "/ext_If/kma_owner_portal/content_pop.aspx";

/// Base for `/FileServerRoot/...` links found on static pages.
pub const DEFAULT_KGIS_BASE_URL: &str = "https://kiatechinfo.snapon.com";

/// Static pages scraped in static mode.
pub const DEFAULT_STATIC_PAGES: [&str; 4] = [
    "https://kiatechinfo.snapon.com/KiaEmergencyResponseGuide.aspx",
    "https://kiatechinfo.snapon.com/J2534DiagnosticsAndProgramming.aspx",
    "https://kiatechinfo.snapon.com/KiaPositioningStatements.aspx",
    "https://kiatechinfo.snapon.com/SeatBeltInstallationGuide.aspx",
];

/// Remote endpoints consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// JSON gateway for `/cmm/gvmh` (catalog) and `/cmm/gam` (tokens).
    pub gateway_url: String,
    /// Tech-info root, used for session refresh and to absolutize iframe links.
    pub tech_info_base_url: String,
    /// Form endpoint that trades an access token for the viewer page.
    pub token_exchange_url: String,
    /// Base for static-page document links.
    pub kgis_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            tech_info_base_url: DEFAULT_TECH_INFO_BASE_URL.to_string(),
            token_exchange_url: format!("{DEFAULT_TECH_INFO_BASE_URL}{TOKEN_EXCHANGE_PATH}"),
            kgis_base_url: DEFAULT_KGIS_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Points every endpoint at a single host, keeping the live path layout.
    ///
    /// Used for mirrors and mock servers.
    #[must_use]
    pub fn rooted_at(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            gateway_url: format!("{base}/apps/services/owners/apigwServlet.html"),
            tech_info_base_url: base.to_string(),
            token_exchange_url: format!("{base}{TOKEN_EXCHANGE_PATH}"),
            kgis_base_url: base.to_string(),
        }
    }
}

/// Per-call timeouts. Metadata calls are short; document bodies may take minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// TCP/TLS connect timeout for every request.
    pub connect: Duration,
    /// Gateway catalog and token lookups.
    pub gateway: Duration,
    /// Every tech-info portal call: the session refresh GET and the token
    /// exchange form POST that follows it.
    pub session: Duration,
    /// Plain GET of a static page.
    pub page: Duration,
    /// Whole document download.
    pub document: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            gateway: Duration::from_secs(30),
            session: Duration::from_secs(10),
            page: Duration::from_secs(15),
            document: Duration::from_secs(900),
        }
    }
}

/// Browser rendering settings for static pages populated client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// W3C WebDriver endpoint (e.g. `http://localhost:9515`). `None` fetches pages with plain GET.
    pub webdriver_url: Option<String>,
    /// Delay after page load before capturing markup.
    pub settle: Duration,
    /// Maximum time the browser may spend loading a page.
    pub page_load_timeout: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            webdriver_url: None,
            settle: Duration::from_secs(3),
            page_load_timeout: Duration::from_secs(300),
        }
    }
}

/// Complete configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Archive root directory.
    pub output_dir: PathBuf,
    /// Remote endpoints.
    pub endpoints: Endpoints,
    /// Headers replayed on the token exchange.
    pub fingerprint: BrowserFingerprint,
    /// Per-call timeouts.
    pub timeouts: Timeouts,
    /// Pages scraped in static mode, in processing order.
    pub static_pages: Vec<String>,
    /// Optional browser rendering for static pages.
    pub render: RenderSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            endpoints: Endpoints::default(),
            fingerprint: BrowserFingerprint::default(),
            timeouts: Timeouts::default(),
            static_pages: DEFAULT_STATIC_PAGES.iter().map(ToString::to_string).collect(),
            render: RenderSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Directory receiving static-page documents.
    #[must_use]
    pub fn static_output_dir(&self) -> PathBuf {
        self.output_dir.join(STATIC_SUBDIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints_match_live_portal_layout() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.gateway_url, DEFAULT_GATEWAY_URL);
        assert_eq!(
            endpoints.token_exchange_url,
            "https://www.kiatechinfo.com/ext_If/kma_owner_portal/content_pop.aspx"
        );
    }

    #[test]
    fn test_rooted_at_trims_trailing_slash() {
        let endpoints = Endpoints::rooted_at("http://127.0.0.1:8080/");
        assert_eq!(endpoints.tech_info_base_url, "http://127.0.0.1:8080");
        assert_eq!(
            endpoints.gateway_url,
            "http://127.0.0.1:8080/apps/services/owners/apigwServlet.html"
        );
        assert_eq!(
            endpoints.token_exchange_url,
            "http://127.0.0.1:8080/ext_If/kma_owner_portal/content_pop.aspx"
        );
        assert_eq!(endpoints.kgis_base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_static_output_dir_nests_under_root() {
        let config = PipelineConfig {
            output_dir: PathBuf::from("/archive"),
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.static_output_dir(),
            PathBuf::from("/archive/KGIS_Static")
        );
    }

    #[test]
    fn test_default_timeouts_separate_metadata_from_documents() {
        let timeouts = Timeouts::default();
        assert!(timeouts.session < timeouts.document);
        assert_eq!(timeouts.document, Duration::from_secs(900));
    }
}
