//! Mapping helpers from port failures to domain errors.

use std::time::Duration;

use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{PlaceCacheError, PlaceSourceError, SearchMetricsError};

pub(super) fn map_source_error(error: PlaceSourceError) -> Error {
    let details = json!({ "reason": error.kind() });
    if error.is_timeout() {
        Error::provider_timeout(format!("place provider timed out: {error}")).with_details(details)
    } else {
        Error::provider_unavailable(format!("place provider unavailable: {error}"))
            .with_details(details)
    }
}

pub(super) fn map_elapsed(budget: Duration) -> Error {
    Error::provider_timeout(format!(
        "place provider did not answer within {}s",
        budget.as_secs_f64()
    ))
}

pub(super) fn map_cache_error(error: PlaceCacheError) -> Error {
    Error::internal(format!("search cache failed: {error}"))
}

pub(super) fn map_metrics_error(error: SearchMetricsError) -> Error {
    Error::internal(format!("search metrics unavailable: {error}"))
}
