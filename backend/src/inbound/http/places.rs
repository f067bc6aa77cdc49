//! Place search endpoint.
//!
//! ```text
//! GET /api/v1/places?category=park&lat=19.43&lon=-99.13&time=evening
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;

use crate::domain::SearchRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::public_short_lived_header;
use crate::inbound::http::schemas::{ErrorSchema, SearchOutcomeSchema};
use crate::inbound::http::state::HttpState;

/// Raw query string for place searches.
///
/// Every field is optional here; validation happens in the domain so that
/// missing and malformed values produce the same error payloads everywhere.
#[derive(Debug, Default, Deserialize)]
pub struct PlacesQuery {
    pub category: Option<String>,
    /// Spanish alias for `category`.
    pub categoria: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub time: Option<String>,
    /// Alias for `time`.
    #[serde(rename = "timeBucket")]
    pub time_bucket: Option<String>,
    pub mood: Option<String>,
    pub budget: Option<String>,
}

impl From<PlacesQuery> for SearchRequest {
    fn from(query: PlacesQuery) -> Self {
        let preferences: BTreeMap<String, String> = [("mood", query.mood), ("budget", query.budget)]
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| (name.to_owned(), value)))
            .collect();
        Self {
            category: query.category.or(query.categoria),
            lat: query.lat,
            lon: query.lon,
            time_bucket: query.time.or(query.time_bucket),
            preferences,
        }
    }
}

/// Search nearby places for a category.
#[utoipa::path(
    get,
    path = "/api/v1/places",
    params(
        ("category" = String, Query, description = "Category, synonym, or key=value tag (alias: categoria)"),
        ("lat" = f64, Query, description = "Latitude in decimal degrees"),
        ("lon" = f64, Query, description = "Longitude in decimal degrees"),
        ("time" = Option<String>, Query, description = "morning, afternoon, or evening (alias: timeBucket)"),
        ("mood" = Option<String>, Query, description = "Preference echoed in the response"),
        ("budget" = Option<String>, Query, description = "Preference echoed in the response")
    ),
    responses(
        (status = 200, description = "Ranked places", body = SearchOutcomeSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Place provider unavailable", body = ErrorSchema),
        (status = 504, description = "Place provider timed out", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["places"],
    operation_id = "searchPlaces"
)]
#[get("/places")]
pub async fn search_places(
    state: web::Data<HttpState>,
    query: web::Query<PlacesQuery>,
) -> ApiResult<HttpResponse> {
    let outcome = state.search.search(query.into_inner().into()).await?;
    Ok(HttpResponse::Ok()
        .insert_header(public_short_lived_header())
        .json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn aliases_fill_in_missing_canonical_fields() {
        let request = SearchRequest::from(PlacesQuery {
            categoria: Some("parque".to_owned()),
            time_bucket: Some("tarde".to_owned()),
            ..PlacesQuery::default()
        });
        assert_eq!(request.category.as_deref(), Some("parque"));
        assert_eq!(request.time_bucket.as_deref(), Some("tarde"));
    }

    #[rstest]
    fn canonical_fields_win_over_aliases() {
        let request = SearchRequest::from(PlacesQuery {
            category: Some("park".to_owned()),
            categoria: Some("museo".to_owned()),
            time: Some("evening".to_owned()),
            time_bucket: Some("morning".to_owned()),
            ..PlacesQuery::default()
        });
        assert_eq!(request.category.as_deref(), Some("park"));
        assert_eq!(request.time_bucket.as_deref(), Some("evening"));
    }

    #[rstest]
    fn mood_and_budget_become_preferences() {
        let request = SearchRequest::from(PlacesQuery {
            mood: Some("calm".to_owned()),
            ..PlacesQuery::default()
        });
        assert_eq!(
            request.preferences,
            BTreeMap::from([("mood".to_owned(), "calm".to_owned())])
        );
    }
}
