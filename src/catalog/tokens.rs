//! Per-model access token discovery.

use serde_json::json;
use tracing::{debug, instrument, warn};

use super::gateway::{self, GatewayError, MANUALS_API, ManualsPayload};
use super::{AccessToken, ModelTarget};
use crate::config::{Endpoints, Timeouts};
use crate::fetch::Fetcher;

/// Lists the access tokens of one model, logging and swallowing any failure.
pub async fn list_tokens(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    timeouts: &Timeouts,
    target: &ModelTarget,
) -> Vec<AccessToken> {
    match fetch_tokens(fetcher, endpoints, timeouts, target).await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(model = %target, stage = "tokens", error = %e, "token lookup failed");
            Vec::new()
        }
    }
}

/// Lists the access tokens of one model.
///
/// The year is sent as a string, matching what the portal front end posts.
/// Null, empty and non-string tokens are dropped.
///
/// # Errors
///
/// Returns [`GatewayError`] on transport failure, malformed JSON, or a
/// response without the manuals list.
#[instrument(level = "debug", skip_all, fields(model = %target))]
pub async fn fetch_tokens(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    timeouts: &Timeouts,
    target: &ModelTarget,
) -> Result<Vec<AccessToken>, GatewayError> {
    let body = json!({
        "modelYear": target.year.to_string(),
        "modelName": target.name,
    });
    let payload: Option<ManualsPayload> = gateway::call(
        fetcher,
        &endpoints.gateway_url,
        MANUALS_API,
        &body,
        timeouts.gateway,
    )
    .await?;

    let records = payload
        .and_then(|payload| payload.automated_manuals)
        .ok_or(GatewayError::MissingField {
            api: MANUALS_API,
            field: "payload.automatedManuals",
        })?;

    let total = records.len();
    let tokens: Vec<AccessToken> = records
        .into_iter()
        .filter_map(|record| {
            record
                .access_payload
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .filter(|token| !token.is_empty())
                .map(AccessToken::new)
        })
        .collect();
    debug!(total, usable = tokens.len(), "manual records received");
    Ok(tokens)
}
