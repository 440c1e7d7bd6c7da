//! OFP metadata client.
//!
//! A fetch is a single GET against the JSON fetcher endpoint. The response is
//! accepted only when every required section is present and non-empty; there
//! is no partially populated [`FlightMetadata`].

use reqwest::{Client, Url};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::model::FlightMetadata;

const OPERATION: &str = "fetch_metadata";
const REQUIRED_SECTIONS: [&str; 5] = ["fetch", "params", "origin", "destination", "aircraft"];
const DEFAULT_AIRLINE: &str = "Private Charter";
const NOT_AVAILABLE: &str = "N/A";

/// Client for the remote metadata endpoint.
#[derive(Clone, Debug)]
pub struct MetadataClient {
    client: Client,
    endpoint: Url,
}

impl MetadataClient {
    /// Create a client for `endpoint` using the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidRequest`] when `endpoint` is not an absolute URL.
    pub fn new(client: Client, endpoint: &str) -> SyncResult<Self> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|_| {
            SyncError::invalid(
                "metadata_url",
                "must be an absolute URL",
                Some(endpoint.to_string()),
            )
        })?;
        Ok(Self { client, endpoint })
    }

    /// Fetch the latest flight plan metadata for `user_id`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidRequest`] for a blank user identifier.
    /// - [`SyncError::Network`] on transport failure.
    /// - [`SyncError::Service`] on a non-success status.
    /// - [`SyncError::MalformedResponse`] when the body is not JSON.
    /// - [`SyncError::IncompleteData`] when required sections or fields are absent.
    pub async fn fetch(&self, user_id: &str) -> SyncResult<FlightMetadata> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(SyncError::invalid("user_id", "must not be empty", None));
        }

        let url = self.request_url(user_id);
        debug!(url = %url, "fetching flight plan metadata");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| SyncError::network(OPERATION, url.as_str(), source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Service {
                operation: OPERATION,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| SyncError::network(OPERATION, url.as_str(), source))?;
        let document: Value =
            serde_json::from_slice(&body).map_err(|source| SyncError::MalformedResponse {
                operation: OPERATION,
                url: url.to_string(),
                source,
            })?;

        parse_metadata(&document)
    }

    fn request_url(&self, user_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("userid", user_id)
            .append_pair("json", "1");
        url
    }
}

/// Extract a [`FlightMetadata`] snapshot from an OFP JSON document.
///
/// # Errors
///
/// Returns [`SyncError::IncompleteData`] naming the first missing section or field,
/// or [`SyncError::InvalidData`] when an airport code is not purely alphanumeric.
pub fn parse_metadata(document: &Value) -> SyncResult<FlightMetadata> {
    for name in REQUIRED_SECTIONS {
        section(document, name).ok_or_else(|| SyncError::incomplete(name, None))?;
    }

    let params = required_section(document, "params")?;
    let origin = required_section(document, "origin")?;
    let destination = required_section(document, "destination")?;
    let aircraft = required_section(document, "aircraft")?;
    let general = section(document, "general");

    let optional = |map: Option<&Map<String, Value>>, key: &str, default: &str| {
        map.and_then(|map| text(map, key))
            .unwrap_or_else(|| default.to_string())
    };

    Ok(FlightMetadata {
        icao_airline: optional(general, "icao_airline", DEFAULT_AIRLINE),
        flight_number: optional(general, "flight_number", NOT_AVAILABLE),
        aircraft_type: optional(Some(aircraft), "icao_code", NOT_AVAILABLE),
        origin_icao: airport_code(origin, "origin")?,
        destination_icao: airport_code(destination, "destination")?,
        origin_name: optional(Some(origin), "name", NOT_AVAILABLE),
        destination_name: optional(Some(destination), "name", NOT_AVAILABLE),
        time_generated: required_text(params, "params", "time_generated")?,
    })
}

fn section<'a>(document: &'a Value, name: &str) -> Option<&'a Map<String, Value>> {
    document
        .get(name)
        .and_then(Value::as_object)
        .filter(|map| !map.is_empty())
}

fn required_section<'a>(
    document: &'a Value,
    name: &'static str,
) -> SyncResult<&'a Map<String, Value>> {
    section(document, name).ok_or_else(|| SyncError::incomplete(name, None))
}

fn required_text(
    map: &Map<String, Value>,
    section: &'static str,
    field: &'static str,
) -> SyncResult<String> {
    text(map, field).ok_or_else(|| SyncError::incomplete(section, Some(field)))
}

/// Airport codes end up in local file names, so only ASCII letters and digits pass.
fn airport_code(map: &Map<String, Value>, section: &'static str) -> SyncResult<String> {
    let code = required_text(map, section, "icao_code")?;
    if code.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        Ok(code)
    } else {
        Err(SyncError::invalid_data(section, "icao_code", code))
    }
}

fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(value) => {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}
