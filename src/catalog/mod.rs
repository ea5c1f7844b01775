//! Target discovery.
//!
//! A run starts from a list of [`Target`]s: vehicle models discovered through
//! the owner portal gateway (dynamic mode), or configured static pages
//! (static mode). Each model target is then expanded into [`AccessToken`]s by
//! [`tokens`].
//!
//! Lookups never fail loudly. A gateway failure is logged and yields an empty
//! list; deciding whether an empty list is fatal belongs to the pipeline.

pub mod gateway;
pub mod tokens;

use std::collections::HashSet;
use std::fmt;

use serde_json::json;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::{Endpoints, Timeouts};
use crate::fetch::Fetcher;
use gateway::{GatewayError, VEHICLE_MODELS_API, VehicleModelsPayload};

pub use gateway::gateway_headers;
pub use tokens::{fetch_tokens, list_tokens};

/// One vehicle model and year offered by the owner portal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelTarget {
    /// Model year.
    pub year: u32,
    /// Display name as returned by the portal.
    pub name: String,
}

/// One static page scraped for document links.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageTarget {
    /// Absolute page URL.
    pub url: String,
}

/// A catalog entry requiring document discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Vehicle model (dynamic mode).
    Model(ModelTarget),
    /// Static page (static mode).
    Page(PageTarget),
}

impl fmt::Display for ModelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.year, self.name)
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(model) => fmt::Display::fmt(model, f),
            Self::Page(page) => fmt::Display::fmt(page, f),
        }
    }
}

/// Opaque per-document credential, consumed by one token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of debug logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<{} chars>)", self.0.len())
    }
}

/// Fetches the model catalog, logging and swallowing any failure.
///
/// An empty result means "nothing to do" to the caller, which is how an
/// unreachable gateway and an empty catalog look alike.
pub async fn list_model_targets(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    timeouts: &Timeouts,
) -> Vec<ModelTarget> {
    match fetch_model_targets(fetcher, endpoints, timeouts).await {
        Ok(models) => {
            info!(count = models.len(), "vehicle catalog loaded");
            models
        }
        Err(e) => {
            error!(stage = "catalog", error = %e, "vehicle catalog lookup failed");
            Vec::new()
        }
    }
}

/// Fetches the model catalog from the gateway.
///
/// Records without a usable year or name are skipped.
///
/// # Errors
///
/// Returns [`GatewayError`] on transport failure, malformed JSON, or a
/// response without the model list.
#[instrument(level = "debug", skip_all)]
pub async fn fetch_model_targets(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    timeouts: &Timeouts,
) -> Result<Vec<ModelTarget>, GatewayError> {
    let body = json!({ "modelYear": 0, "modelName": "ALL" });
    let payload: Option<VehicleModelsPayload> = gateway::call(
        fetcher,
        &endpoints.gateway_url,
        VEHICLE_MODELS_API,
        &body,
        timeouts.gateway,
    )
    .await?;

    let records = payload
        .and_then(|payload| payload.vehicle_models)
        .ok_or(GatewayError::MissingField {
            api: VEHICLE_MODELS_API,
            field: "payload.vehicleModelHU",
        })?;

    let mut models = Vec::with_capacity(records.len());
    for record in records {
        let year = record
            .model_year
            .as_ref()
            .and_then(gateway::year_from_value)
            .filter(|year| *year > 0);
        let name = record.model_name.as_ref().and_then(gateway::non_empty_str);
        match (year, name) {
            (Some(year), Some(name)) => models.push(ModelTarget {
                year,
                name: name.trim().to_string(),
            }),
            _ => debug!(?record, "skipping incomplete catalog record"),
        }
    }
    Ok(models)
}

/// Turns the configured page list into page targets.
///
/// Order is preserved and duplicates are dropped. Entries that are not
/// absolute http(s) URLs with a host are skipped with a warning.
#[must_use]
pub fn static_page_targets(urls: &[String]) -> Vec<PageTarget> {
    let mut seen = HashSet::new();
    let mut pages = Vec::with_capacity(urls.len());
    for raw in urls {
        let candidate = raw.trim();
        if !is_http_url(candidate) {
            warn!(url = %raw, "skipping malformed static page URL");
            continue;
        }
        if seen.insert(candidate.to_string()) {
            pages.push(PageTarget {
                url: candidate.to_string(),
            });
        }
    }
    pages
}

fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    })
}
