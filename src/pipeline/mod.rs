//! Run orchestration: catalog → tokens → session refresh → URL → download.
//!
//! The pipeline owns the configuration, the shared [`Fetcher`] session and an
//! optional [`PageRenderer`]. Work is strictly sequential; each stage's failure
//! is logged with the target, stage and token ordinal and the run moves on.
//! Only an empty vehicle catalog aborts a dynamic-mode run.

mod error;
mod summary;

pub use error::PipelineError;
pub use summary::RunSummary;

use std::fmt;
use std::path::PathBuf;

use tracing::{error, info, instrument, warn};

use crate::catalog::{self, ModelTarget, PageTarget, Target};
use crate::config::PipelineConfig;
use crate::download::{
    self, ContentTypePolicy, DownloadOutcome, model_document_path, static_document_path,
};
use crate::fetch::Fetcher;
use crate::render::{PageRenderer, WebDriverRenderer};
use crate::resolver::{self, ResolvedDocument};
use crate::session;

/// Input mode of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Vehicle catalog and per-model access tokens.
    Dynamic,
    /// Configured static pages.
    Static,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic => f.write_str("dynamic"),
            Self::Static => f.write_str("static"),
        }
    }
}

/// Drives one run over every target of a [`Mode`].
pub struct Pipeline {
    config: PipelineConfig,
    fetcher: Fetcher,
    renderer: Option<Box<dyn PageRenderer>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("fetcher", &self.fetcher)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline around an existing session, without a renderer.
    #[must_use]
    pub fn new(config: PipelineConfig, fetcher: Fetcher) -> Self {
        Self {
            config,
            fetcher,
            renderer: None,
        }
    }

    /// Builds the session and, when a WebDriver URL is configured, the renderer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Client`] if the HTTP client cannot be built, or
    /// [`PipelineError::Renderer`] if the WebDriver endpoint is unusable.
    pub fn from_config(config: PipelineConfig) -> Result<Self, PipelineError> {
        let fetcher = Fetcher::new(config.timeouts.connect)?;
        let renderer: Option<Box<dyn PageRenderer>> = match &config.render.webdriver_url {
            Some(endpoint) => Some(Box::new(WebDriverRenderer::new(endpoint, &config.render)?)),
            None => None,
        };
        Ok(Self {
            config,
            fetcher,
            renderer,
        })
    }

    /// Replaces the page renderer used in static mode.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Processes every target of `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyCatalog`] when a dynamic run finds no
    /// models. Per-item failures are logged and counted, never returned.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, mode: Mode) -> Result<RunSummary, PipelineError> {
        let summary = match mode {
            Mode::Dynamic => self.run_dynamic().await?,
            Mode::Static => self.run_static().await,
        };
        info!(
            %mode,
            targets = summary.targets,
            documents = summary.documents,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            unresolved = summary.unresolved,
            bytes = summary.bytes,
            "run complete"
        );
        Ok(summary)
    }

    async fn run_dynamic(&self) -> Result<RunSummary, PipelineError> {
        let endpoints = &self.config.endpoints;
        let timeouts = &self.config.timeouts;

        let models = catalog::list_model_targets(&self.fetcher, endpoints, timeouts).await;
        if models.is_empty() {
            error!(stage = "catalog", "no vehicle models found; aborting");
            return Err(PipelineError::EmptyCatalog {
                gateway_url: endpoints.gateway_url.clone(),
            });
        }

        let mut summary = RunSummary::new();
        summary.targets = models.len();
        for (index, model) in models.iter().enumerate() {
            info!(model = %model, position = index + 1, of = models.len(), "processing model");
            self.process_model(model, &mut summary).await;
        }
        Ok(summary)
    }

    async fn process_model(&self, model: &ModelTarget, summary: &mut RunSummary) {
        let endpoints = &self.config.endpoints;
        let timeouts = &self.config.timeouts;

        let tokens = catalog::list_tokens(&self.fetcher, endpoints, timeouts, model).await;
        if tokens.is_empty() {
            warn!(model = %model, stage = "tokens", "no manuals found for model");
            return;
        }

        let total = tokens.len();
        for (index, token) in tokens.iter().enumerate() {
            let ordinal = index + 1;
            info!(model = %model, ordinal, total, "resolving manual");

            session::refresh(&self.fetcher, &endpoints.tech_info_base_url, timeouts.session)
                .await;

            let Some(url) = resolver::resolve_token_url(
                &self.fetcher,
                endpoints,
                &self.config.fingerprint,
                timeouts,
                token,
                model,
                ordinal,
            )
            .await
            else {
                warn!(model = %model, ordinal, stage = "resolve", "skipping manual without a PDF link");
                summary.record_unresolved();
                continue;
            };

            let destination = model_document_path(&self.config.output_dir, model, ordinal, &url);
            let document = ResolvedDocument {
                url,
                target: Target::Model(model.clone()),
                ordinal,
            };
            self.save(&document, destination, ContentTypePolicy::Trust, summary)
                .await;
        }
    }

    async fn run_static(&self) -> RunSummary {
        let pages = catalog::static_page_targets(&self.config.static_pages);
        let mut summary = RunSummary::new();
        summary.targets = pages.len();
        info!(
            pages = pages.len(),
            output_dir = %self.config.static_output_dir().display(),
            rendered = self.renderer.is_some(),
            "starting static page mode"
        );

        for page in &pages {
            self.process_page(page, &mut summary).await;
        }
        summary
    }

    async fn process_page(&self, page: &PageTarget, summary: &mut RunSummary) {
        let html = match resolver::load_page_html(
            &self.fetcher,
            self.renderer.as_deref(),
            page,
            self.config.timeouts.page,
        )
        .await
        {
            Ok(html) if !html.trim().is_empty() => html,
            Ok(_) => {
                error!(page = %page, stage = "page", "page returned no content; skipping");
                return;
            }
            Err(e) => {
                error!(page = %page, stage = "page", error = %e, "failed to load page; skipping");
                return;
            }
        };

        let paths = resolver::extract_static_pdf_paths(&html);
        if paths.is_empty() {
            warn!(page = %page, "no document links found; page likely requires dynamic rendering");
            return;
        }
        info!(page = %page, links = paths.len(), "document links found");

        for (index, path) in paths.iter().enumerate() {
            let ordinal = index + 1;
            let url = match resolver::absolutize_url(path, &self.config.endpoints.kgis_base_url) {
                Ok(url) => url,
                Err(e) => {
                    warn!(page = %page, ordinal, stage = "resolve", error = %e, "skipping link");
                    summary.record_unresolved();
                    continue;
                }
            };

            let destination = static_document_path(&self.config.output_dir, path);
            let document = ResolvedDocument {
                url,
                target: Target::Page(page.clone()),
                ordinal,
            };
            self.save(&document, destination, ContentTypePolicy::Strict, summary)
                .await;
        }
    }

    async fn save(
        &self,
        document: &ResolvedDocument,
        destination: PathBuf,
        policy: ContentTypePolicy,
        summary: &mut RunSummary,
    ) {
        summary.documents += 1;
        let outcome = download::download(
            &self.fetcher,
            &document.url,
            &destination,
            policy,
            self.config.timeouts.document,
        )
        .await;
        if outcome == DownloadOutcome::Failed {
            warn!(
                item = %document.target,
                ordinal = document.ordinal,
                stage = "download",
                url = %document.url,
                "document not saved"
            );
        }
        summary.record(outcome);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::render::RenderError;

    struct FailingRenderer;

    #[async_trait]
    impl PageRenderer for FailingRenderer {
        async fn render(&self, _url: &str) -> Result<String, RenderError> {
            Err(RenderError::malformed("page source", "test"))
        }
    }

    fn offline_config(root: &std::path::Path) -> PipelineConfig {
        PipelineConfig {
            output_dir: root.to_path_buf(),
            static_pages: vec!["https://kgis.invalid/Guide.aspx".to_string()],
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Dynamic.to_string(), "dynamic");
        assert_eq!(Mode::Static.to_string(), "static");
    }

    #[test]
    fn test_from_config_rejects_bad_webdriver_url() {
        let mut config = PipelineConfig::default();
        config.render.webdriver_url = Some("chromedriver".to_string());
        let err = Pipeline::from_config(config).unwrap_err();
        assert!(matches!(err, PipelineError::Renderer(_)));
    }

    #[tokio::test]
    async fn test_static_run_skips_page_when_render_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(Duration::from_secs(1)).unwrap();
        let pipeline = Pipeline::new(offline_config(dir.path()), fetcher)
            .with_renderer(Box::new(FailingRenderer));

        let summary = pipeline.run(Mode::Static).await.unwrap();
        assert_eq!(summary.targets, 1);
        assert_eq!(summary.documents, 0);
        assert!(!dir.path().join("KGIS_Static").exists());
    }

    #[tokio::test]
    async fn test_static_run_with_no_valid_pages_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            static_pages: vec!["not a url".to_string()],
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(config, Fetcher::new(Duration::from_secs(1)).unwrap());

        let summary = pipeline.run(Mode::Static).await.unwrap();
        assert_eq!(summary, RunSummary::default());
    }
}
