//! Prometheus adapter for search counters.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use async_trait::async_trait;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::ports::{MetricsSnapshot, SearchEvent, SearchMetrics, SearchMetricsError};

const CACHE_HIT: &str = "cache_hit";
const CACHE_MISS: &str = "cache_miss";
const PROVIDER_FAILURE: &str = "provider_failure";

/// Prometheus-backed search metrics recorder.
///
/// # Metric Specification
///
/// - `nearby_searches_total` (counter, label `category`): validated searches
///   per resolved category label.
/// - `nearby_search_events_total` (counter, label `event`): `cache_hit`,
///   `cache_miss`, or `provider_failure`.
pub struct PrometheusSearchMetrics {
    searches_total: IntCounterVec,
    events_total: IntCounterVec,
    // Label values seen so far; collectors cannot enumerate their children.
    categories: RwLock<BTreeSet<String>>,
}

impl PrometheusSearchMetrics {
    /// Create and register the counters with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a counter with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let searches_total = IntCounterVec::new(
            Opts::new("nearby_searches_total", "Validated searches by category"),
            &["category"],
        )?;
        let events_total = IntCounterVec::new(
            Opts::new("nearby_search_events_total", "Search outcomes by event"),
            &["event"],
        )?;
        registry.register(Box::new(searches_total.clone()))?;
        registry.register(Box::new(events_total.clone()))?;
        Ok(Self {
            searches_total,
            events_total,
            categories: RwLock::new(BTreeSet::new()),
        })
    }

    fn event_count(&self, event: &str) -> u64 {
        self.events_total.with_label_values(&[event]).get()
    }
}

const fn event_label(event: SearchEvent) -> &'static str {
    match event {
        SearchEvent::CacheHit => CACHE_HIT,
        SearchEvent::CacheMiss => CACHE_MISS,
        SearchEvent::ProviderFailure => PROVIDER_FAILURE,
    }
}

fn poisoned<T>(_: T) -> SearchMetricsError {
    SearchMetricsError::backend("category index lock poisoned")
}

#[async_trait]
impl SearchMetrics for PrometheusSearchMetrics {
    async fn record_request(&self, category: &str) -> Result<(), SearchMetricsError> {
        self.searches_total.with_label_values(&[category]).inc();
        let known = self.categories.read().map_err(poisoned)?.contains(category);
        if !known {
            self.categories
                .write()
                .map_err(poisoned)?
                .insert(category.to_owned());
        }
        Ok(())
    }

    async fn record_event(&self, event: SearchEvent) -> Result<(), SearchMetricsError> {
        self.events_total.with_label_values(&[event_label(event)]).inc();
        Ok(())
    }

    async fn snapshot(&self) -> Result<MetricsSnapshot, SearchMetricsError> {
        let per_category = self
            .categories
            .read()
            .map_err(poisoned)?
            .iter()
            .map(|category| {
                let count = self.searches_total.with_label_values(&[category.as_str()]).get();
                (category.clone(), count)
            })
            .collect::<BTreeMap<_, _>>();
        Ok(MetricsSnapshot {
            total_requests: per_category.values().sum(),
            cache_hits: self.event_count(CACHE_HIT),
            cache_misses: self.event_count(CACHE_MISS),
            provider_failures: self.event_count(PROVIDER_FAILURE),
            per_category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> (Registry, PrometheusSearchMetrics) {
        let registry = Registry::new();
        let metrics = PrometheusSearchMetrics::new(&registry)
            .expect("metric registration should succeed");
        (registry, metrics)
    }

    #[test]
    fn registers_counters_with_registry() {
        let (registry, metrics) = metrics();
        metrics.searches_total.with_label_values(&["park"]).inc();
        metrics.events_total.with_label_values(&[CACHE_MISS]).inc();

        let families = registry.gather();
        for name in ["nearby_searches_total", "nearby_search_events_total"] {
            assert!(
                families.iter().any(|f| f.name() == name),
                "{name} should be registered"
            );
        }
    }

    #[test]
    fn registering_twice_in_one_registry_fails() {
        let (registry, _metrics) = metrics();
        assert!(PrometheusSearchMetrics::new(&registry).is_err());
    }

    #[tokio::test]
    async fn counts_requests_per_category_and_events() {
        let (_registry, metrics) = metrics();
        for category in ["park", "park", "cafe"] {
            metrics.record_request(category).await.expect("record");
        }
        for event in [
            SearchEvent::CacheMiss,
            SearchEvent::CacheHit,
            SearchEvent::CacheMiss,
            SearchEvent::ProviderFailure,
        ] {
            metrics.record_event(event).await.expect("record");
        }

        let per_category = BTreeMap::from([("cafe".to_owned(), 1), ("park".to_owned(), 2)]);
        let snapshot = metrics.snapshot().await.expect("snapshot");
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                total_requests: 3,
                cache_hits: 1,
                cache_misses: 2,
                provider_failures: 1,
                per_category,
            }
        );
        assert_eq!(metrics.searches_total.with_label_values(&["park"]).get(), 2);
    }

    #[tokio::test]
    async fn snapshots_serialise_in_camel_case() {
        let (_registry, metrics) = metrics();
        metrics.record_request("park").await.expect("record");

        let json = serde_json::to_value(metrics.snapshot().await.expect("snapshot"))
            .expect("serialise");
        assert_eq!(json["totalRequests"], 1);
        assert_eq!(json["perCategory"]["park"], 1);
        assert_eq!(json["providerFailures"], 0);
    }
}
