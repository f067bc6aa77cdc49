//! Validation of raw search parameters.
//!
//! Every check here runs before any provider round-trip.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::warn;

use super::Error;
use super::geo::{Coordinate, CoordinateError};
use super::time_bucket::TimeBucket;

/// Unvalidated search parameters as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// Category token.
    pub category: Option<String>,
    /// Latitude text.
    pub lat: Option<String>,
    /// Longitude text.
    pub lon: Option<String>,
    /// Time bucket token.
    pub time_bucket: Option<String>,
    /// Opaque preferences (mood, budget, ...) echoed in the response.
    pub preferences: BTreeMap<String, String>,
}

/// A validated search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Category token, not yet resolved.
    pub category: String,
    /// Query center.
    pub center: Coordinate,
    /// Requested bucket.
    pub bucket: Option<TimeBucket>,
    /// Normalised preferences: lowercase names, trimmed non-blank values.
    pub preferences: BTreeMap<String, String>,
}

impl TryFrom<SearchRequest> for SearchQuery {
    type Error = Error;

    fn try_from(request: SearchRequest) -> Result<Self, Self::Error> {
        let category = required(request.category, "category")?;
        let lat = required(request.lat, "lat")?;
        let lon = required(request.lon, "lon")?;

        let lat = parse_degrees(&lat, "lat")?;
        let lon = parse_degrees(&lon, "lon")?;
        let center = Coordinate::new(lat, lon).map_err(|err| {
            let field = match err {
                CoordinateError::LongitudeOutOfRange => "lon",
                CoordinateError::NotFinite | CoordinateError::LatitudeOutOfRange => "lat",
            };
            Error::invalid_coordinate(err.to_string()).with_details(json!({ "field": field }))
        })?;

        let bucket = request
            .time_bucket
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| {
                let bucket = TimeBucket::parse(raw);
                if bucket.is_none() {
                    warn!(time_bucket = raw, "ignoring unrecognised time bucket");
                }
                bucket
            });

        let preferences = request
            .preferences
            .into_iter()
            .filter_map(|(name, value)| {
                let name = name.trim().to_lowercase();
                let value = value.trim().to_owned();
                (!name.is_empty() && !value.is_empty()).then_some((name, value))
            })
            .collect();

        Ok(Self {
            category,
            center,
            bucket,
            preferences,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, Error> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| {
            Error::missing_parameter(format!("{field} is required"))
                .with_details(json!({ "field": field }))
        })
}

fn parse_degrees(raw: &str, field: &'static str) -> Result<f64, Error> {
    let value: f64 = raw.parse().map_err(|_| {
        Error::invalid_coordinate(format!("{field} must be a number, got '{raw}'"))
            .with_details(json!({ "field": field }))
    })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid_coordinate(format!("{field} must be finite"))
            .with_details(json!({ "field": field })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn request() -> SearchRequest {
        SearchRequest {
            category: Some("park".to_owned()),
            lat: Some("19.43".to_owned()),
            lon: Some("-99.13".to_owned()),
            time_bucket: None,
            preferences: BTreeMap::new(),
        }
    }

    #[rstest]
    fn valid_request_is_accepted(request: SearchRequest) {
        let query = SearchQuery::try_from(request).expect("valid request");
        assert_eq!(query.category, "park");
        assert_eq!(
            query.center,
            Coordinate {
                lat: 19.43,
                lon: -99.13,
            }
        );
        assert_eq!(query.bucket, None);
    }

    #[rstest]
    #[case::category(|r: &mut SearchRequest| r.category = None, "category")]
    #[case::blank_category(|r: &mut SearchRequest| r.category = Some("  ".to_owned()), "category")]
    #[case::lat(|r: &mut SearchRequest| r.lat = None, "lat")]
    #[case::lon(|r: &mut SearchRequest| r.lon = None, "lon")]
    fn missing_fields_are_reported(
        mut request: SearchRequest,
        #[case] strip: fn(&mut SearchRequest),
        #[case] field: &str,
    ) {
        strip(&mut request);
        let error = SearchQuery::try_from(request).expect_err("missing field");
        assert_eq!(error.code(), ErrorCode::MissingParameter);
        assert_eq!(error.details(), Some(&json!({ "field": field })));
    }

    #[rstest]
    #[case("abc", "-99.13", "lat")]
    #[case("NaN", "-99.13", "lat")]
    #[case("inf", "-99.13", "lat")]
    #[case("95", "-99.13", "lat")]
    #[case("19.43", "-181", "lon")]
    #[case("19.43", "west", "lon")]
    fn invalid_coordinates_are_rejected(
        mut request: SearchRequest,
        #[case] lat: &str,
        #[case] lon: &str,
        #[case] field: &str,
    ) {
        request.lat = Some(lat.to_owned());
        request.lon = Some(lon.to_owned());
        let error = SearchQuery::try_from(request).expect_err("invalid coordinate");
        assert_eq!(error.code(), ErrorCode::InvalidCoordinate);
        assert_eq!(error.details(), Some(&json!({ "field": field })));
    }

    #[rstest]
    fn missing_parameters_are_reported_before_bad_coordinates(mut request: SearchRequest) {
        request.category = None;
        request.lat = Some("abc".to_owned());
        let error = SearchQuery::try_from(request).expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::MissingParameter);
    }

    #[rstest]
    #[case(Some("Noche"), Some(TimeBucket::Evening))]
    #[case(Some("brunch"), None)]
    #[case(Some("  "), None)]
    fn time_buckets_are_parsed_leniently(
        mut request: SearchRequest,
        #[case] raw: Option<&str>,
        #[case] expected: Option<TimeBucket>,
    ) {
        request.time_bucket = raw.map(str::to_owned);
        let query = SearchQuery::try_from(request).expect("valid request");
        assert_eq!(query.bucket, expected);
    }

    #[rstest]
    fn preferences_are_normalised(mut request: SearchRequest) {
        request.preferences = [
            (" Mood ".to_owned(), " calm ".to_owned()),
            ("budget".to_owned(), " ".to_owned()),
        ]
        .into();
        let query = SearchQuery::try_from(request).expect("valid request");
        assert_eq!(
            query.preferences,
            BTreeMap::from([("mood".to_owned(), "calm".to_owned())])
        );
    }
}
