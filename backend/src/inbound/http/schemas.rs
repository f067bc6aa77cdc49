//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use std::collections::BTreeMap;

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// A required parameter is absent or blank.
    #[schema(rename = "missing_parameter")]
    MissingParameter,
    /// A raw category token is not `key=value`.
    #[schema(rename = "invalid_category_format")]
    InvalidCategoryFormat,
    /// No dictionary entry claims the category token.
    #[schema(rename = "unknown_category")]
    UnknownCategory,
    /// A coordinate is non-numeric, non-finite, or out of range.
    #[schema(rename = "invalid_coordinate")]
    InvalidCoordinate,
    /// The place provider failed.
    #[schema(rename = "provider_unavailable")]
    ProviderUnavailable,
    /// The place provider exceeded its time budget.
    #[schema(rename = "provider_timeout")]
    ProviderTimeout,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "unknown_category")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "no category named 'volcano'")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::TimeBucket`].
#[derive(ToSchema)]
#[schema(as = crate::domain::TimeBucket)]
pub enum TimeBucketSchema {
    /// Hours before noon.
    #[schema(rename = "morning")]
    Morning,
    /// Noon until six in the evening.
    #[schema(rename = "afternoon")]
    Afternoon,
    /// Six in the evening until the end of the day.
    #[schema(rename = "evening")]
    Evening,
}

/// OpenAPI schema for [`crate::domain::PriceTier`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PriceTier)]
pub enum PriceTierSchema {
    #[schema(rename = "free")]
    Free,
    #[schema(rename = "budget")]
    Budget,
    #[schema(rename = "moderate")]
    Moderate,
    #[schema(rename = "expensive")]
    Expensive,
    #[schema(rename = "luxury")]
    Luxury,
}

/// OpenAPI schema for [`crate::domain::PlaceFlags`].
///
/// Amenity flags derived from provider tags; `null` means unknown.
#[derive(ToSchema)]
#[schema(as = crate::domain::PlaceFlags)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PlaceFlagsSchema {
    wheelchair: Option<bool>,
    wifi: Option<bool>,
    indoor: Option<bool>,
    outdoor_seating: Option<bool>,
    kid_friendly: Option<bool>,
    pet_friendly: Option<bool>,
    price_tier: Option<PriceTierSchema>,
}

/// OpenAPI schema for [`crate::domain::Place`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Place)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PlaceSchema {
    /// Provider element reference.
    #[schema(example = "way/4178235")]
    id: String,
    #[schema(example = "Parque México")]
    name: String,
    /// Resolved category label.
    #[schema(example = "park")]
    category: String,
    lat: f64,
    lon: f64,
    /// Postal address or the literal `unavailable`.
    #[schema(example = "Avenida México 10, Ciudad de México")]
    address: String,
    phone: Option<String>,
    #[schema(example = "Mo-Su 06:00-22:00")]
    opening_hours: Option<String>,
    website: Option<String>,
    description: Option<String>,
    /// Relevance score; higher ranks first.
    score: u32,
    /// Distance from the query center in metres.
    distance_metres: Option<f64>,
    flags: PlaceFlagsSchema,
}

/// OpenAPI schema for [`crate::domain::SearchOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SearchOutcome)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SearchOutcomeSchema {
    #[schema(example = "park")]
    category: String,
    time_bucket: Option<TimeBucketSchema>,
    /// `false` when time filtering was relaxed to keep results.
    was_strict: bool,
    /// `true` when a strict time filter shaped the results.
    filtered_by_time: bool,
    /// Passthrough preferences echoed from the request.
    preferences: BTreeMap<String, String>,
    places: Vec<PlaceSchema>,
}

/// OpenAPI schema for [`crate::domain::ports::MetricsSnapshot`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::MetricsSnapshot)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MetricsSnapshotSchema {
    total_requests: u64,
    cache_hits: u64,
    cache_misses: u64,
    provider_failures: u64,
    per_category: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_variants_match_domain() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        for code in [
            "missing_parameter",
            "invalid_category_format",
            "unknown_category",
            "invalid_coordinate",
            "provider_unavailable",
            "provider_timeout",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_has_expected_name() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("message"));
        assert!(schema_json.contains("traceId"));
    }

    #[test]
    fn search_outcome_schema_uses_camel_case() {
        let schema_json = schema_to_json::<SearchOutcomeSchema>();
        assert!(schema_json.contains("wasStrict"));
        assert!(schema_json.contains("filteredByTime"));
        assert!(schema_json.contains("timeBucket"));
    }

    #[test]
    fn place_schema_uses_camel_case() {
        let schema_json = schema_to_json::<PlaceSchema>();
        assert!(schema_json.contains("openingHours"));
        assert!(schema_json.contains("distanceMetres"));
    }
}
