//! Config file loading and layering: defaults < config file < CLI flags.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use manual_downloader::config::{Endpoints, PipelineConfig};
use manual_downloader::user_agent::BrowserFingerprint;
use serde::Deserialize;
use tracing::debug;

use crate::cli::Args;

const CONFIG_DIR_NAME: &str = "manual-downloader";
const CONFIG_FILE_NAME: &str = "config.toml";

const MAX_TIMEOUT_SECS: u64 = 3600;
const MAX_SETTLE_SECS: u64 = 60;

/// On-disk configuration. Every field is optional; missing values keep defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub output_dir: Option<PathBuf>,
    pub static_pages: Option<Vec<String>>,
    #[serde(default)]
    pub endpoints: EndpointsSection,
    #[serde(default)]
    pub timeouts: TimeoutsSection,
    #[serde(default)]
    pub render: RenderSection,
    pub fingerprint: Option<BrowserFingerprint>,
}

/// `[endpoints]`; `base_url` re-roots every endpoint before individual overrides.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EndpointsSection {
    pub base_url: Option<String>,
    pub gateway_url: Option<String>,
    pub tech_info_base_url: Option<String>,
    pub token_exchange_url: Option<String>,
    pub kgis_base_url: Option<String>,
}

/// `[timeouts]`, in whole seconds.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TimeoutsSection {
    pub connect_secs: Option<u64>,
    pub gateway_secs: Option<u64>,
    pub session_secs: Option<u64>,
    pub page_secs: Option<u64>,
    pub document_secs: Option<u64>,
}

/// `[render]`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RenderSection {
    pub webdriver_url: Option<String>,
    pub settle_secs: Option<u64>,
    pub page_load_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Parses a TOML document.
    pub(crate) fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid config file")
    }

    /// Rejects values the pipeline cannot run with.
    pub(crate) fn validate(&self) -> Result<()> {
        let timeouts = [
            ("timeouts.connect_secs", self.timeouts.connect_secs),
            ("timeouts.gateway_secs", self.timeouts.gateway_secs),
            ("timeouts.session_secs", self.timeouts.session_secs),
            ("timeouts.page_secs", self.timeouts.page_secs),
            ("timeouts.document_secs", self.timeouts.document_secs),
            (
                "render.page_load_timeout_secs",
                self.render.page_load_timeout_secs,
            ),
        ];
        for (key, value) in timeouts {
            if let Some(secs) = value
                && !(1..=MAX_TIMEOUT_SECS).contains(&secs)
            {
                bail!("{key} must be between 1 and {MAX_TIMEOUT_SECS}, got {secs}");
            }
        }
        if let Some(settle) = self.render.settle_secs
            && settle > MAX_SETTLE_SECS
        {
            bail!("render.settle_secs must be at most {MAX_SETTLE_SECS}, got {settle}");
        }

        let urls = [
            ("endpoints.base_url", &self.endpoints.base_url),
            ("endpoints.gateway_url", &self.endpoints.gateway_url),
            ("endpoints.tech_info_base_url", &self.endpoints.tech_info_base_url),
            ("endpoints.token_exchange_url", &self.endpoints.token_exchange_url),
            ("endpoints.kgis_base_url", &self.endpoints.kgis_base_url),
            ("render.webdriver_url", &self.render.webdriver_url),
        ];
        for (key, value) in urls {
            if let Some(url) = value {
                validate_http_url(key, url)?;
            }
        }

        if self
            .output_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            bail!("output_dir must not be empty");
        }
        Ok(())
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value).with_context(|| format!("{key} is not a URL: {value}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("{key} must use http or https, got {value}");
    }
    Ok(())
}

/// Default config location: `$XDG_CONFIG_HOME/manual-downloader/config.toml`,
/// else `$HOME/.config/manual-downloader/config.toml`.
pub(crate) fn default_config_path() -> Option<PathBuf> {
    config_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let base = xdg_config_home
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            home.filter(|value| !value.is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
        })?;
    Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Loads the config file.
///
/// An explicit path must exist. The default path is optional.
pub(crate) fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(None),
        },
    };

    if !path.exists() {
        if required {
            bail!("config file not found: {}", path.display());
        }
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(None);
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = FileConfig::from_toml(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config file {}", path.display()))?;
    debug!(path = %path.display(), "config file loaded");
    Ok(Some(config))
}

/// Layers the config file and CLI flags over the built-in defaults.
pub(crate) fn build_pipeline_config(file: Option<FileConfig>, args: &Args) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default();

    if let Some(file) = file {
        apply_file_config(&mut config, file);
    }

    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(url) = &args.webdriver_url {
        validate_http_url("--webdriver-url", url)?;
        config.render.webdriver_url = Some(url.clone());
    }
    Ok(config)
}

fn apply_file_config(config: &mut PipelineConfig, file: FileConfig) {
    if let Some(dir) = file.output_dir {
        config.output_dir = dir;
    }
    if let Some(pages) = file.static_pages {
        config.static_pages = pages;
    }
    if let Some(fingerprint) = file.fingerprint {
        config.fingerprint = fingerprint;
    }

    let endpoints = file.endpoints;
    if let Some(base) = &endpoints.base_url {
        config.endpoints = Endpoints::rooted_at(base);
    }
    override_with(&mut config.endpoints.gateway_url, endpoints.gateway_url);
    override_with(&mut config.endpoints.tech_info_base_url, endpoints.tech_info_base_url);
    override_with(&mut config.endpoints.token_exchange_url, endpoints.token_exchange_url);
    override_with(&mut config.endpoints.kgis_base_url, endpoints.kgis_base_url);

    let timeouts = file.timeouts;
    override_secs(&mut config.timeouts.connect, timeouts.connect_secs);
    override_secs(&mut config.timeouts.gateway, timeouts.gateway_secs);
    override_secs(&mut config.timeouts.session, timeouts.session_secs);
    override_secs(&mut config.timeouts.page, timeouts.page_secs);
    override_secs(&mut config.timeouts.document, timeouts.document_secs);

    let render = file.render;
    if render.webdriver_url.is_some() {
        config.render.webdriver_url = render.webdriver_url;
    }
    override_secs(&mut config.render.settle, render.settle_secs);
    override_secs(
        &mut config.render.page_load_timeout,
        render.page_load_timeout_secs,
    );
}

fn override_with(slot: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn override_secs(slot: &mut Duration, value: Option<u64>) {
    if let Some(secs) = value {
        *slot = Duration::from_secs(secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["manual-downloader"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let file = FileConfig::from_toml("").unwrap();
        file.validate().unwrap();
        let config = build_pipeline_config(Some(file), &args(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let file = FileConfig::from_toml(
            r#"
            output_dir = "/srv/manuals"
            static_pages = ["https://kgis.example/a.aspx"]

            [endpoints]
            base_url = "http://127.0.0.1:9000"
            kgis_base_url = "https://files.example"

            [timeouts]
            document_secs = 120

            [render]
            settle_secs = 5
            "#,
        )
        .unwrap();
        file.validate().unwrap();
        let config = build_pipeline_config(Some(file), &args(&[])).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/srv/manuals"));
        assert_eq!(config.static_pages, vec!["https://kgis.example/a.aspx"]);
        assert_eq!(
            config.endpoints.gateway_url,
            "http://127.0.0.1:9000/apps/services/owners/apigwServlet.html"
        );
        assert_eq!(config.endpoints.tech_info_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.endpoints.kgis_base_url, "https://files.example");
        assert_eq!(config.timeouts.document, Duration::from_secs(120));
        assert_eq!(config.timeouts.session, Duration::from_secs(10));
        assert_eq!(config.render.settle, Duration::from_secs(5));
    }

    #[test]
    fn test_cli_flags_override_file() {
        let file = FileConfig::from_toml(
            r#"
            output_dir = "/srv/manuals"
            [render]
            webdriver_url = "http://grid:4444"
            "#,
        )
        .unwrap();
        let config = build_pipeline_config(
            Some(file),
            &args(&["-o", "local", "--webdriver-url", "http://localhost:9515"]),
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("local"));
        assert_eq!(
            config.render.webdriver_url.as_deref(),
            Some("http://localhost:9515")
        );
    }

    #[test]
    fn test_fingerprint_section_is_partial() {
        let file = FileConfig::from_toml(
            r#"
            [fingerprint]
            user_agent = "Custom/1.0"
            "#,
        )
        .unwrap();
        let config = build_pipeline_config(Some(file), &args(&[])).unwrap();
        assert_eq!(config.fingerprint.user_agent, "Custom/1.0");
        assert_eq!(config.fingerprint.origin, "https://owners.kia.com");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(FileConfig::from_toml("concurrency = 4").is_err());
        assert!(FileConfig::from_toml("[timeouts]\nretry_secs = 4").is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_timeouts() {
        let file = FileConfig::from_toml("[timeouts]\ndocument_secs = 0").unwrap();
        let err = file.validate().unwrap_err();
        assert!(err.to_string().contains("timeouts.document_secs"));

        let file = FileConfig::from_toml("[render]\nsettle_secs = 61").unwrap();
        assert!(file.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_urls() {
        let file = FileConfig::from_toml("[endpoints]\ngateway_url = \"ftp://gw.example\"").unwrap();
        assert!(file.validate().is_err());

        let file = FileConfig::from_toml("[endpoints]\nkgis_base_url = \"not a url\"").unwrap();
        assert!(file.validate().is_err());
    }

    #[test]
    fn test_invalid_webdriver_flag_rejected() {
        let result = build_pipeline_config(None, &args(&["--webdriver-url", "localhost:9515"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_path_prefers_xdg_then_home() {
        let path = config_path_from(Some("/xdg".into()), Some("/home/u".into())).unwrap();
        assert_eq!(path, PathBuf::from("/xdg/manual-downloader/config.toml"));

        let path = config_path_from(None, Some("/home/u".into())).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/home/u/.config/manual-downloader/config.toml")
        );

        let path = config_path_from(Some("".into()), Some("/home/u".into())).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/home/u/.config/manual-downloader/config.toml")
        );

        assert!(config_path_from(None, None).is_none());
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_file_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_explicit_config_is_loaded_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "output_dir = \"x\"\n").unwrap();
        let loaded = load_file_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.output_dir, Some(PathBuf::from("x")));

        std::fs::write(&path, "[timeouts]\nconnect_secs = 99999\n").unwrap();
        assert!(load_file_config(Some(&path)).is_err());
    }
}
