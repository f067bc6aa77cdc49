//! Domain orchestration for place searches.
//!
//! One search runs validation, category resolution, a cache lookup and, on a
//! miss, radius escalation against the provider followed by temporal
//! filtering and ranking. Only complete, successful results are cached.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDateTime};
use mockable::Clock;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::Error;
use crate::domain::category::{CategoryResolver, ResolvedCategory};
use crate::domain::geo::{BoundingBox, Coordinate};
use crate::domain::place::{Candidate, Place};
use crate::domain::ports::{
    CacheKeyMaterial, CachedSearch, MetricsSnapshot, PlaceCache, PlaceQuery, PlaceSource,
    ProviderElement, SearchCacheKey, SearchEvent, SearchMetrics,
};
use crate::domain::scoring::{PlaceScorer, ScoringContext, rank};
use crate::domain::search_query::{SearchQuery, SearchRequest};
use crate::domain::search_radius::{EscalationState, RadiusEscalation, RadiusSchedule};
use crate::domain::temporal_filter::{FilterMode, TemporalFilter};
use crate::domain::time_bucket::{BucketConvention, TimeBucket};

mod mapping;

/// Engine tuning shared by every search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEngineConfig {
    /// Radii tried in order until one yields places.
    pub radii: RadiusSchedule,
    /// Maximum places returned.
    pub top_n: usize,
    /// Decimal places kept from the query center.
    pub coordinate_precision: u32,
    /// Budget for a single provider round-trip.
    pub provider_timeout: Duration,
    /// Hour ranges used for time buckets.
    pub convention: BucketConvention,
    /// Fixed offset for "now"; the host's local zone when unset.
    pub utc_offset: Option<FixedOffset>,
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self {
            radii: RadiusSchedule::default(),
            top_n: 4,
            coordinate_precision: 4,
            provider_timeout: Duration::from_secs(30),
            convention: BucketConvention::default(),
            utc_offset: None,
        }
    }
}

/// Port bundle required by the search service.
pub struct PlaceSearchPorts {
    /// Outbound provider adapter.
    pub source: Arc<dyn PlaceSource>,
    /// Result cache adapter.
    pub cache: Arc<dyn PlaceCache>,
    /// Request counters.
    pub metrics: Arc<dyn SearchMetrics>,
}

impl PlaceSearchPorts {
    /// Build a strongly-typed search port bundle.
    pub fn new(
        source: Arc<dyn PlaceSource>,
        cache: Arc<dyn PlaceCache>,
        metrics: Arc<dyn SearchMetrics>,
    ) -> Self {
        Self {
            source,
            cache,
            metrics,
        }
    }
}

/// Response envelope for one search.
///
/// Serialises identically whether it was computed or read from cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Resolved category label.
    pub category: String,
    /// Requested bucket, when one was recognised.
    pub time_bucket: Option<TimeBucket>,
    /// `false` when time filtering was relaxed.
    pub was_strict: bool,
    /// `true` when a strict time filter shaped the results.
    pub filtered_by_time: bool,
    /// Echoed passthrough preferences.
    pub preferences: BTreeMap<String, String>,
    /// Ranked places, at most `top_n`.
    pub places: Vec<Place>,
}

/// Place discovery and ranking service.
pub struct PlaceSearchService {
    source: Arc<dyn PlaceSource>,
    cache: Arc<dyn PlaceCache>,
    metrics: Arc<dyn SearchMetrics>,
    resolver: CategoryResolver,
    scorer: Arc<dyn PlaceScorer>,
    clock: Arc<dyn Clock>,
    filter: TemporalFilter,
    config: SearchEngineConfig,
}

impl PlaceSearchService {
    /// Build a search service.
    /// ```rust,ignore
    /// let service = PlaceSearchService::new(ports, resolver, scorer, clock, config);
    /// ```
    pub fn new(
        ports: PlaceSearchPorts,
        resolver: CategoryResolver,
        scorer: Arc<dyn PlaceScorer>,
        clock: Arc<dyn Clock>,
        config: SearchEngineConfig,
    ) -> Self {
        Self {
            source: ports.source,
            cache: ports.cache,
            metrics: ports.metrics,
            resolver,
            scorer,
            clock,
            filter: TemporalFilter::new(config.convention),
            config,
        }
    }

    /// Engine configuration in use.
    pub const fn config(&self) -> &SearchEngineConfig {
        &self.config
    }

    /// Run one search.
    ///
    /// # Errors
    /// Validation and resolution errors are raised before the provider is
    /// contacted. Provider failures surface as
    /// [`ErrorCode::ProviderUnavailable`](crate::domain::ErrorCode::ProviderUnavailable)
    /// or [`ErrorCode::ProviderTimeout`](crate::domain::ErrorCode::ProviderTimeout)
    /// and leave the cache untouched.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchOutcome, Error> {
        let query = SearchQuery::try_from(request)?;
        let resolved = self.resolver.resolve(&query.category)?;
        let center = query.center.rounded(self.config.coordinate_precision);
        let key = SearchCacheKey::derive(&CacheKeyMaterial {
            label: &resolved.label,
            center,
            precision: self.config.coordinate_precision,
            bucket: query.bucket,
            preferences: &query.preferences,
        });

        if let Err(error) = self.metrics.record_request(&resolved.label).await {
            warn!(%error, "failed to record search request");
        }

        if let Some(cached) = self.cached(&key).await {
            self.record_event(SearchEvent::CacheHit).await;
            debug!(cache_key = %key, "serving search from cache");
            let places = cached.places.clone();
            return Ok(envelope(&resolved, &query, places, cached.mode));
        }
        self.record_event(SearchEvent::CacheMiss).await;

        let computed = self.compute(&resolved, &query, center).await?;
        let outcome = envelope(&resolved, &query, computed.places.clone(), computed.mode);
        if let Err(error) = self.cache.put(&key, Arc::new(computed)).await {
            warn!(cache_key = %key, %error, "failed to cache search results");
        }
        Ok(outcome)
    }

    /// Drop every cached search; returns how many entries were removed.
    ///
    /// # Errors
    /// [`ErrorCode::InternalError`](crate::domain::ErrorCode::InternalError)
    /// when the cache backend fails.
    pub async fn flush_cache(&self) -> Result<usize, Error> {
        let removed = self
            .cache
            .flush_all()
            .await
            .map_err(mapping::map_cache_error)?;
        info!(removed, "flushed search cache");
        Ok(removed)
    }

    /// Drop expired cache entries; returns how many were removed.
    ///
    /// # Errors
    /// [`ErrorCode::InternalError`](crate::domain::ErrorCode::InternalError)
    /// when the cache backend fails.
    pub async fn evict_expired(&self) -> Result<usize, Error> {
        self.cache
            .evict_expired()
            .await
            .map_err(mapping::map_cache_error)
    }

    /// Current request counters.
    ///
    /// # Errors
    /// [`ErrorCode::InternalError`](crate::domain::ErrorCode::InternalError)
    /// when the metrics backend fails.
    pub async fn metrics_snapshot(&self) -> Result<MetricsSnapshot, Error> {
        self.metrics
            .snapshot()
            .await
            .map_err(mapping::map_metrics_error)
    }

    async fn cached(&self, key: &SearchCacheKey) -> Option<Arc<CachedSearch>> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(error) => {
                warn!(cache_key = %key, %error, "cache read failed; treating as miss");
                None
            }
        }
    }

    async fn compute(
        &self,
        resolved: &ResolvedCategory,
        query: &SearchQuery,
        center: Coordinate,
    ) -> Result<CachedSearch, Error> {
        let candidates = self.escalate(resolved, center).await?;
        let filtered = self
            .filter
            .apply(candidates, query.bucket, self.local_now());
        let context = ScoringContext {
            bucket: query.bucket,
            convention: self.config.convention,
        };
        let places = rank(
            filtered.candidates,
            self.scorer.as_ref(),
            &context,
            self.config.top_n,
        );
        Ok(CachedSearch {
            places,
            mode: filtered.mode,
        })
    }

    async fn escalate(
        &self,
        resolved: &ResolvedCategory,
        center: Coordinate,
    ) -> Result<Vec<Candidate>, Error> {
        let mut escalation = RadiusEscalation::new(&self.config.radii);
        while let Some(radius) = escalation.pending_radius() {
            let request = PlaceQuery {
                tags: resolved.tags.clone(),
                bounding_box: BoundingBox::around(center, radius),
            };
            let elements = self.fetch(&request, radius).await?;
            let fetched = elements.len();
            let candidates: Vec<Candidate> = elements
                .into_iter()
                .filter_map(|element| Candidate::from_element(element, &resolved.label, center))
                .collect();
            debug!(
                category = %resolved.label,
                radius,
                fetched,
                usable = candidates.len(),
                "provider attempt finished"
            );
            escalation.record(candidates);
        }

        match escalation.into_state() {
            EscalationState::Found { radius, results } => {
                info!(category = %resolved.label, radius, found = results.len(), "places found");
                Ok(results)
            }
            EscalationState::Exhausted | EscalationState::Trying { .. } => {
                info!(category = %resolved.label, "no places at any radius");
                Ok(Vec::new())
            }
        }
    }

    async fn fetch(
        &self,
        request: &PlaceQuery,
        radius: f64,
    ) -> Result<Vec<ProviderElement>, Error> {
        let result = tokio::time::timeout(self.config.provider_timeout, self.source.fetch(request))
            .await
            .map_err(|_| mapping::map_elapsed(self.config.provider_timeout))
            .and_then(|fetched| fetched.map_err(mapping::map_source_error));
        if let Err(error) = &result {
            warn!(radius, code = ?error.code(), %error, "provider call failed");
            self.record_event(SearchEvent::ProviderFailure).await;
        }
        result
    }

    async fn record_event(&self, event: SearchEvent) {
        if let Err(error) = self.metrics.record_event(event).await {
            warn!(?event, %error, "failed to record search event");
        }
    }

    fn local_now(&self) -> NaiveDateTime {
        match self.config.utc_offset {
            Some(offset) => self.clock.utc().with_timezone(&offset).naive_local(),
            None => self.clock.local().naive_local(),
        }
    }
}

fn envelope(
    resolved: &ResolvedCategory,
    query: &SearchQuery,
    places: Vec<Place>,
    mode: FilterMode,
) -> SearchOutcome {
    SearchOutcome {
        category: resolved.label.clone(),
        time_bucket: query.bucket,
        was_strict: mode.was_strict(),
        filtered_by_time: mode.filtered_by_time(),
        preferences: query.preferences.clone(),
        places,
    }
}
