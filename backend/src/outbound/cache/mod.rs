//! In-process TTL cache for ranked search results.
//!
//! Entries live in one `RwLock`ed table keyed by the namespaced cache key.
//! Reads treat expired entries as misses; a background sweep removes them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::ports::{CachedSearch, PlaceCache, PlaceCacheError, SearchCacheKey};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Entry {
    expires_at: DateTime<Utc>,
    value: Arc<CachedSearch>,
}

/// `RwLock`-guarded map with a fixed TTL.
pub struct InMemoryPlaceCache {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl InMemoryPlaceCache {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// Whether the table holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

fn poisoned<T>(_: T) -> PlaceCacheError {
    PlaceCacheError::backend("cache lock poisoned")
}

#[async_trait]
impl PlaceCache for InMemoryPlaceCache {
    async fn get(
        &self,
        key: &SearchCacheKey,
    ) -> Result<Option<Arc<CachedSearch>>, PlaceCacheError> {
        let now = self.now();
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(key.as_str())
            .filter(|entry| entry.expires_at > now)
            .map(|entry| Arc::clone(&entry.value)))
    }

    async fn put(
        &self,
        key: &SearchCacheKey,
        value: Arc<CachedSearch>,
    ) -> Result<(), PlaceCacheError> {
        let expires_at = self
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.as_str().to_owned(), Entry { expires_at, value });
        Ok(())
    }

    async fn flush_all(&self) -> Result<usize, PlaceCacheError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    async fn evict_expired(&self) -> Result<usize, PlaceCacheError> {
        let now = self.now();
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(before - entries.len())
    }
}

/// Periodically evict expired entries until the task is aborted.
pub fn spawn_sweeper(cache: Arc<dyn PlaceCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match cache.evict_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "evicted expired search results"),
                Err(error) => warn!(%error, "cache sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeBucket;
    use crate::domain::geo::Coordinate;
    use crate::domain::ports::CacheKeyMaterial;
    use crate::domain::temporal_filter::FilterMode;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use std::collections::BTreeMap;

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let now = Utc
            .with_ymd_and_hms(2024, 6, 3, 12, 0, 0)
            .single()
            .expect("valid time");
        Arc::new(MutableClock::new(now))
    }

    fn key(label: &str) -> SearchCacheKey {
        SearchCacheKey::derive(&CacheKeyMaterial {
            label,
            center: Coordinate {
                lat: 19.4326,
                lon: -99.1332,
            },
            precision: 4,
            bucket: Some(TimeBucket::Evening),
            preferences: &BTreeMap::new(),
        })
    }

    fn value() -> Arc<CachedSearch> {
        Arc::new(CachedSearch {
            places: Vec::new(),
            mode: FilterMode::Relaxed,
        })
    }

    #[rstest]
    #[tokio::test]
    async fn stored_entries_are_returned_until_they_expire(clock: Arc<MutableClock>) {
        let cache = InMemoryPlaceCache::new(DEFAULT_TTL, clock.clone());
        let stored = value();
        cache.put(&key("park"), stored.clone()).await.expect("put");

        clock.advance_seconds(299);
        let hit = cache.get(&key("park")).await.expect("get");
        assert!(hit.is_some_and(|hit| Arc::ptr_eq(&hit, &stored)));

        clock.advance_seconds(1);
        assert!(cache.get(&key("park")).await.expect("get").is_none());
        assert_eq!(cache.len(), 1, "lazy expiry leaves the entry for the sweep");
    }

    #[rstest]
    #[tokio::test]
    async fn put_replaces_and_restarts_the_ttl(clock: Arc<MutableClock>) {
        let cache = InMemoryPlaceCache::new(DEFAULT_TTL, clock.clone());
        cache.put(&key("park"), value()).await.expect("put");
        clock.advance_seconds(200);
        let replacement = value();
        cache.put(&key("park"), replacement.clone()).await.expect("replace");
        clock.advance_seconds(200);

        let hit = cache.get(&key("park")).await.expect("get").expect("still live");
        assert!(Arc::ptr_eq(&hit, &replacement));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn evict_expired_removes_only_stale_entries(clock: Arc<MutableClock>) {
        let cache = InMemoryPlaceCache::new(DEFAULT_TTL, clock.clone());
        cache.put(&key("park"), value()).await.expect("put");
        clock.advance_seconds(250);
        cache.put(&key("cafe"), value()).await.expect("put");
        clock.advance_seconds(100);

        assert_eq!(cache.evict_expired().await.expect("evict"), 1);
        assert!(cache.get(&key("cafe")).await.expect("get").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn flush_all_empties_the_table(clock: Arc<MutableClock>) {
        let cache = InMemoryPlaceCache::new(DEFAULT_TTL, clock);
        cache.put(&key("park"), value()).await.expect("put");
        cache.put(&key("cafe"), value()).await.expect("put");

        assert_eq!(cache.flush_all().await.expect("flush"), 2);
        assert!(cache.is_empty());
        assert!(cache.get(&key("park")).await.expect("get").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn sweeper_evicts_in_the_background(clock: Arc<MutableClock>) {
        let cache = Arc::new(InMemoryPlaceCache::new(
            Duration::from_secs(5),
            clock.clone(),
        ));
        cache.put(&key("park"), value()).await.expect("put");
        clock.advance_seconds(10);

        let handle = spawn_sweeper(cache.clone(), Duration::from_secs(1));
        for _ in 0..50 {
            if cache.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        handle.abort();

        assert!(cache.is_empty());
    }
}
