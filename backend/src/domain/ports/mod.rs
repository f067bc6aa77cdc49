//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod place_cache;
mod place_source;
mod search_metrics;

pub use cache_key::{CacheKeyMaterial, SearchCacheKey};
#[cfg(test)]
pub use place_cache::MockPlaceCache;
pub use place_cache::{CachedSearch, DisabledPlaceCache, PlaceCache, PlaceCacheError};
#[cfg(test)]
pub use place_source::MockPlaceSource;
pub use place_source::{
    ElementGeometry, PlaceQuery, PlaceSource, PlaceSourceError, ProviderElement,
};
#[cfg(test)]
pub use search_metrics::MockSearchMetrics;
pub use search_metrics::{
    MetricsSnapshot, NoOpSearchMetrics, SearchEvent, SearchMetrics, SearchMetricsError,
};
