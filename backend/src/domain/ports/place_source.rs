//! Driven port for fetching candidate places from a geospatial provider.
//!
//! The domain owns the request and element shapes so the search engine stays
//! adapter-agnostic. One call covers every tag alternative for one bounding
//! box.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::category::TagPair;
use crate::domain::geo::{BoundingBox, Coordinate};
use crate::domain::tags::TagMap;

/// Position reported for a provider element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementGeometry {
    /// A node's own coordinate.
    Point(Coordinate),
    /// A provider-computed centre for a way or relation.
    Centroid(Coordinate),
}

impl ElementGeometry {
    /// The coordinate regardless of how it was obtained.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        match self {
            Self::Point(coordinate) | Self::Centroid(coordinate) => *coordinate,
        }
    }
}

/// One raw element returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderElement {
    /// OSM element type (`node`, `way`, or `relation`).
    pub element_type: String,
    /// Raw OSM element identifier.
    pub id: i64,
    /// Position, when the provider supplied one.
    pub geometry: Option<ElementGeometry>,
    /// Raw OSM tags.
    pub tags: TagMap,
}

/// One provider round-trip: every tag alternative inside one box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
    /// Tag pairs ORed together.
    pub tags: Vec<TagPair>,
    /// Search region.
    pub bounding_box: BoundingBox,
}

define_port_error! {
    /// Errors surfaced while calling the provider.
    pub enum PlaceSourceError {
        /// Network transport failed or the provider answered with a server error.
        Transport { message: String } =>
            "place provider transport failed: {message}",
        /// The provider exceeded its query time budget.
        Timeout { message: String } =>
            "place provider timed out: {message}",
        /// The provider rate-limited the request.
        RateLimited { message: String } =>
            "place provider rate limited request: {message}",
        /// The provider response could not be decoded.
        Decode { message: String } =>
            "place provider response decode failed: {message}",
        /// The adapter rejected the request before execution.
        InvalidRequest { message: String } =>
            "place provider request invalid: {message}",
    }
}

impl PlaceSourceError {
    /// Whether this failure is a time-budget overrun.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Port for querying candidate places.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Fetch raw elements matching any of the query's tags inside its box.
    async fn fetch(&self, query: &PlaceQuery) -> Result<Vec<ProviderElement>, PlaceSourceError>;
}

