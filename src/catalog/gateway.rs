//! Owner portal API gateway: request headers, wire types, decode errors.
//!
//! The gateway is a single servlet that dispatches on the `apiurl` header.
//! Both lookups the pipeline needs are JSON POSTs answered with a
//! `{"payload": {...}}` envelope.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::fetch::{Fetcher, TransportError};

/// Gateway route listing every vehicle model and year.
pub const VEHICLE_MODELS_API: &str = "/cmm/gvmh";

/// Gateway route listing technical manual access tokens for one model.
pub const MANUALS_API: &str = "/cmm/gam";

/// Errors raised by a gateway lookup.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP exchange itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body was not the expected JSON.
    #[error("malformed JSON from gateway route {api}: {source}")]
    Decode {
        /// Gateway route that produced the body.
        api: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The JSON decoded but the expected field was absent.
    #[error("gateway route {api} response has no `{field}` field")]
    MissingField {
        /// Gateway route that produced the body.
        api: &'static str,
        /// Dotted path of the missing field.
        field: &'static str,
    },
}

/// `{"payload": ...}` envelope shared by every gateway response.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Envelope<P> {
    pub payload: Option<P>,
}

/// `/cmm/gvmh` payload.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct VehicleModelsPayload {
    #[serde(rename = "vehicleModelHU", default)]
    pub vehicle_models: Option<Vec<VehicleModelRecord>>,
}

/// One catalog record. Fields stay loose: the portal has served years both as
/// numbers and as strings.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct VehicleModelRecord {
    #[serde(rename = "modelYear", default)]
    pub model_year: Option<Value>,
    #[serde(rename = "modelName", default)]
    pub model_name: Option<Value>,
}

/// `/cmm/gam` payload.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ManualsPayload {
    #[serde(rename = "automatedManuals", default)]
    pub automated_manuals: Option<Vec<ManualRecord>>,
}

/// One manual record; only the access token matters.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ManualRecord {
    #[serde(rename = "accessPayload", default)]
    pub access_payload: Option<Value>,
}

/// Headers routing a POST through the gateway servlet to `api`.
#[must_use]
pub fn gateway_headers(api: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert("apiurl", HeaderValue::from_static(api));
    headers.insert("httpmethod", HeaderValue::from_static("POST"));
    headers.insert("servicetype", HeaderValue::from_static("preLogin"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Sends `body` to gateway route `api` and decodes the envelope payload.
pub(crate) async fn call<B, P>(
    fetcher: &Fetcher,
    gateway_url: &str,
    api: &'static str,
    body: &B,
    timeout: Duration,
) -> Result<Option<P>, GatewayError>
where
    B: Serialize + ?Sized,
    P: DeserializeOwned,
{
    let raw = fetcher
        .post_json(gateway_url, gateway_headers(api), body, timeout)
        .await?;
    debug!(api, bytes = raw.len(), "gateway response received");
    let envelope: Envelope<P> =
        serde_json::from_str(&raw).map_err(|source| GatewayError::Decode { api, source })?;
    Ok(envelope.payload)
}

/// Reads a model year from a JSON number or numeric string.
pub(crate) fn year_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a non-blank string.
pub(crate) fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gateway_headers_route_to_api() {
        let headers = gateway_headers(MANUALS_API);
        assert_eq!(headers.get("apiurl").unwrap(), "/cmm/gam");
        assert_eq!(headers.get("httpmethod").unwrap(), "POST");
        assert_eq!(headers.get("servicetype").unwrap(), "preLogin");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_year_from_value_accepts_number_and_string() {
        assert_eq!(year_from_value(&json!(2024)), Some(2024));
        assert_eq!(year_from_value(&json!("2023")), Some(2023));
        assert_eq!(year_from_value(&json!(" 2022 ")), Some(2022));
        assert_eq!(year_from_value(&json!("twenty")), None);
        assert_eq!(year_from_value(&json!(-1)), None);
        assert_eq!(year_from_value(&json!(null)), None);
    }

    #[test]
    fn test_non_empty_str_rejects_blank_and_non_string() {
        assert_eq!(non_empty_str(&json!("EV6")), Some("EV6"));
        assert_eq!(non_empty_str(&json!("  ")), None);
        assert_eq!(non_empty_str(&json!(42)), None);
    }

    #[test]
    fn test_envelope_tolerates_missing_payload() {
        let envelope: Envelope<VehicleModelsPayload> = serde_json::from_str("{}").unwrap();
        assert!(envelope.payload.is_none());
    }
}
