//! Reqwest-backed Overpass place source.
//!
//! This adapter owns transport details only: query text, timeout and HTTP
//! error mapping, and JSON decoding into provider elements.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::OverpassResponseDto;
use crate::domain::TagPair;
use crate::domain::geo::BoundingBox;
use crate::domain::ports::{PlaceQuery, PlaceSource, PlaceSourceError, ProviderElement};

const DEFAULT_OVERPASS_QUERY_TIMEOUT_SECONDS: u32 = 25;
const DEFAULT_USER_AGENT: &str = "nearby-place-search/0.1";
const DEFAULT_CONTACT: &str = "ops@nearby.invalid";

/// Outbound identity and query timeout settings for Overpass requests.
pub struct OverpassHttpIdentity {
    /// HTTP user-agent sent to Overpass.
    pub user_agent: String,
    /// Contact header value sent to Overpass.
    pub contact: String,
    /// Timeout directive embedded in Overpass query text.
    pub query_timeout_seconds: u32,
}

impl Default for OverpassHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            contact: DEFAULT_CONTACT.to_owned(),
            query_timeout_seconds: DEFAULT_OVERPASS_QUERY_TIMEOUT_SECONDS,
        }
    }
}

/// Place source that POSTs one combined query per call to an Overpass endpoint.
pub struct OverpassHttpSource {
    client: Client,
    endpoint: Url,
    user_agent: String,
    contact: String,
    query_timeout_seconds: u32,
}

impl OverpassHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let source = OverpassHttpSource::new(endpoint, timeout);
    /// assert!(source.is_ok() || source.is_err());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(endpoint, timeout, OverpassHttpIdentity::default())
    }

    /// Build an adapter with explicit outbound identity and query timeout.
    /// ```rust,ignore
    /// let source = OverpassHttpSource::with_identity(endpoint, timeout, identity);
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        endpoint: Url,
        timeout: Duration,
        identity: OverpassHttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            user_agent: identity.user_agent,
            contact: identity.contact,
            query_timeout_seconds: identity.query_timeout_seconds.max(1),
        })
    }
}

#[async_trait]
impl PlaceSource for OverpassHttpSource {
    async fn fetch(&self, query: &PlaceQuery) -> Result<Vec<ProviderElement>, PlaceSourceError> {
        let text = build_overpass_query(query, self.query_timeout_seconds)?;
        debug!(selectors = query.tags.len(), "sending Overpass query");
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header("Contact", self.contact.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", text)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_elements(body.as_ref())
    }
}

fn parse_elements(body: &[u8]) -> Result<Vec<ProviderElement>, PlaceSourceError> {
    let decoded: OverpassResponseDto = serde_json::from_slice(body).map_err(|error| {
        PlaceSourceError::decode(format!("invalid Overpass JSON payload: {error}"))
    })?;
    if let Some(remark) = decoded.remark.as_deref() {
        let lowered = remark.to_lowercase();
        if lowered.contains("timed out") || lowered.contains("timeout") {
            return Err(PlaceSourceError::timeout(remark.to_owned()));
        }
        if lowered.contains("error") {
            return Err(PlaceSourceError::transport(remark.to_owned()));
        }
    }
    Ok(decoded.into_elements())
}

fn build_overpass_query(
    query: &PlaceQuery,
    query_timeout_seconds: u32,
) -> Result<String, PlaceSourceError> {
    if query.tags.is_empty() {
        return Err(PlaceSourceError::invalid_request(
            "at least one tag selector is required",
        ));
    }
    validate_bounding_box(&query.bounding_box)?;
    let (south, west, north, east) = query.bounding_box.as_tuple();
    let bbox = format!("({south},{west},{north},{east})");

    let mut lines = Vec::with_capacity(query.tags.len() * 3);
    for selector in query.tags.iter().map(build_tag_selector) {
        for element_type in ["node", "way", "relation"] {
            lines.push(format!("  {element_type}{selector}{bbox};"));
        }
    }

    Ok(format!(
        "[out:json][timeout:{query_timeout_seconds}];\n(\n{query_lines}\n);\nout center tags;",
        query_lines = lines.join("\n")
    ))
}

fn validate_bounding_box(bounding_box: &BoundingBox) -> Result<(), PlaceSourceError> {
    let (south, west, north, east) = bounding_box.as_tuple();
    if [south, west, north, east]
        .into_iter()
        .any(|value| !value.is_finite())
    {
        return Err(PlaceSourceError::invalid_request(
            "bounding box must contain finite coordinates",
        ));
    }
    if west >= east || south >= north {
        return Err(PlaceSourceError::invalid_request(
            "bounding box edges must be ordered south < north and west < east",
        ));
    }
    Ok(())
}

fn build_tag_selector(tag: &TagPair) -> String {
    format!(
        "[\"{}\"=\"{}\"]",
        escape_quoted(tag.key()),
        escape_quoted(tag.value())
    )
}

fn escape_quoted(raw: &str) -> String {
    raw.replace('\\', r"\\").replace('"', "\\\"")
}

fn map_transport_error(error: reqwest::Error) -> PlaceSourceError {
    if error.is_timeout() {
        PlaceSourceError::timeout(error.to_string())
    } else {
        PlaceSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PlaceSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => PlaceSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PlaceSourceError::timeout(message)
        }
        _ if status.is_client_error() => PlaceSourceError::invalid_request(message),
        _ => PlaceSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
