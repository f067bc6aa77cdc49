//! Port interface for caching ranked search results.
use std::sync::Arc;

use async_trait::async_trait;

use super::{SearchCacheKey, define_port_error};
use crate::domain::place::Place;
use crate::domain::temporal_filter::FilterMode;

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum PlaceCacheError {
        /// Cache backend is unavailable or its state is unusable.
        Backend { message: String } => "place cache backend failure: {message}",
    }
}

/// Final ranked, truncated output of one search.
///
/// Entries are shared as `Arc` snapshots and never mutated after insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSearch {
    /// Ranked places.
    pub places: Vec<Place>,
    /// Temporal filter mode that produced them.
    pub mode: FilterMode,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceCache: Send + Sync {
    /// Read a live entry; expired entries read as misses.
    async fn get(&self, key: &SearchCacheKey) -> Result<Option<Arc<CachedSearch>>, PlaceCacheError>;

    /// Store an entry, replacing any previous one atomically.
    async fn put(
        &self,
        key: &SearchCacheKey,
        value: Arc<CachedSearch>,
    ) -> Result<(), PlaceCacheError>;

    /// Drop every entry; returns how many were removed.
    async fn flush_all(&self) -> Result<usize, PlaceCacheError>;

    /// Drop expired entries; returns how many were removed.
    async fn evict_expired(&self) -> Result<usize, PlaceCacheError>;
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPlaceCache;

#[async_trait]
impl PlaceCache for DisabledPlaceCache {
    async fn get(
        &self,
        _key: &SearchCacheKey,
    ) -> Result<Option<Arc<CachedSearch>>, PlaceCacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _key: &SearchCacheKey,
        _value: Arc<CachedSearch>,
    ) -> Result<(), PlaceCacheError> {
        Ok(())
    }

    async fn flush_all(&self) -> Result<usize, PlaceCacheError> {
        Ok(0)
    }

    async fn evict_expired(&self) -> Result<usize, PlaceCacheError> {
        Ok(0)
    }
}
