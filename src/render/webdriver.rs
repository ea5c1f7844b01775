//! Minimal W3C WebDriver client: one session per rendered page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{PageRenderer, RenderError};
use crate::config::RenderSettings;

// Extra allowance on top of the page load timeout for the driver's own work.
const COMMAND_TIMEOUT_MARGIN: Duration = Duration::from_secs(30);

/// Renders pages in headless Chrome through a WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    client: Client,
    endpoint: String,
    settle: Duration,
    page_load_timeout: Duration,
}

impl WebDriverRenderer {
    /// Creates a renderer for `endpoint` (e.g. `http://localhost:9515`).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidEndpoint`] if `endpoint` is not an absolute
    /// http(s) URL, or [`RenderError::ClientBuild`] if reqwest rejects the
    /// configuration.
    pub fn new(endpoint: &str, settings: &RenderSettings) -> Result<Self, RenderError> {
        let parsed = Url::parse(endpoint).map_err(|_| RenderError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RenderError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
            });
        }

        let client = Client::builder()
            .timeout(settings.page_load_timeout + COMMAND_TIMEOUT_MARGIN)
            .build()
            .map_err(|source| RenderError::ClientBuild { source })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            settle: settings.settle,
            page_load_timeout: settings.page_load_timeout,
        })
    }

    fn capabilities(&self) -> Value {
        let page_load_ms = u64::try_from(self.page_load_timeout.as_millis()).unwrap_or(u64::MAX);
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "pageLoadStrategy": "normal",
                    "timeouts": { "pageLoad": page_load_ms },
                    "goog:chromeOptions": {
                        "args": [
                            "--headless=new",
                            "--disable-gpu",
                            "--no-sandbox",
                            "--disable-dev-shm-usage",
                        ]
                    }
                }
            }
        })
    }

    async fn command(
        &self,
        command: &'static str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, RenderError> {
        let url = format!("{}{path}", self.endpoint);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| RenderError::http(command, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RenderError::http(command, e))?;
        debug!(command, status = status.as_u16(), "webdriver response");

        let parsed: Option<Value> = serde_json::from_str(&text).ok();
        if let Some(error) = parsed
            .as_ref()
            .and_then(|v| v.pointer("/value/error"))
            .and_then(Value::as_str)
        {
            let message = parsed
                .as_ref()
                .and_then(|v| v.pointer("/value/message"))
                .and_then(Value::as_str)
                .unwrap_or("unknown webdriver error");
            return Err(RenderError::Protocol {
                command,
                error: error.to_string(),
                message: message.to_string(),
            });
        }
        if !status.is_success() {
            return Err(RenderError::HttpStatus {
                command,
                status: status.as_u16(),
            });
        }
        parsed.ok_or_else(|| RenderError::malformed(command, "body is not JSON"))
    }

    async fn create_session(&self) -> Result<String, RenderError> {
        let created = self
            .command(
                "new session",
                Method::POST,
                "/session",
                Some(&self.capabilities()),
            )
            .await?;
        created
            .pointer("/value/sessionId")
            .or_else(|| created.pointer("/sessionId"))
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| RenderError::malformed("new session", "missing sessionId"))
    }

    async fn capture(&self, session_id: &str, url: &str) -> Result<String, RenderError> {
        self.command(
            "navigate",
            Method::POST,
            &format!("/session/{session_id}/url"),
            Some(&json!({ "url": url })),
        )
        .await?;

        debug!(settle_ms = self.settle.as_millis(), "waiting for page scripts");
        tokio::time::sleep(self.settle).await;

        let source = self
            .command(
                "page source",
                Method::GET,
                &format!("/session/{session_id}/source"),
                None,
            )
            .await?;
        source
            .get("value")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| RenderError::malformed("page source", "value is not a string"))
    }

    async fn delete_session(&self, session_id: &str) {
        if let Err(e) = self
            .command(
                "delete session",
                Method::DELETE,
                &format!("/session/{session_id}"),
                None,
            )
            .await
        {
            warn!(session_id, error = %e, "failed to close webdriver session");
        }
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    #[instrument(level = "debug", skip(self))]
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        info!(url, "rendering page in browser");
        let session_id = self.create_session().await?;
        let result = self.capture(&session_id, url).await;
        self.delete_session(&session_id).await;
        result
    }
}
