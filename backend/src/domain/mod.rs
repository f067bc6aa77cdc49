//! Domain primitives and services.
//!
//! Purpose: Define strongly typed search entities and the search service that
//! orchestrates them. The domain depends only on its ports; HTTP and
//! provider specifics live in the inbound and outbound adapters.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - PlaceSearchService: validates, resolves, escalates, filters and ranks.

pub mod category;
pub mod error;
pub mod geo;
pub mod opening_hours;
pub mod place;
pub mod place_search;
pub mod ports;
pub mod scoring;
pub mod search_query;
pub mod search_radius;
pub mod tags;
pub mod temporal_filter;
pub mod time_bucket;
pub mod trace_id;

pub use self::category::{
    CatalogueError, CategoryCatalogue, CategoryResolver, CategoryRule, ResolvedCategory,
    ResolverMode, TagPair, TagPairError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo::{BoundingBox, Coordinate, CoordinateError};
pub use self::opening_hours::{OpeningHours, OpeningHoursError};
pub use self::place::{ADDRESS_UNAVAILABLE, Candidate, Place, PlaceFlags, PriceTier};
pub use self::place_search::{
    PlaceSearchPorts, PlaceSearchService, SearchEngineConfig, SearchOutcome,
};
pub use self::scoring::{
    BaselineScorer, EnrichedScorer, PlaceScorer, ScoringContext, ScoringTier, rank,
};
pub use self::search_query::{SearchQuery, SearchRequest};
pub use self::search_radius::{
    EscalationState, RadiusEscalation, RadiusSchedule, RadiusScheduleError,
};
pub use self::tags::{TagBool, TagMap};
pub use self::temporal_filter::{FilterMode, TemporalFilter, TemporalOutcome};
pub use self::time_bucket::{BucketConvention, TimeBucket};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use nearby::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::provider_unavailable("overpass is down"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
