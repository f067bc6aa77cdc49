//! Domain port surface for search request bookkeeping.
//!
//! Counters are a side channel: recording failures are logged by callers and
//! never change a search outcome.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording or reading metrics.
    pub enum SearchMetricsError {
        /// Metrics backend rejected the operation.
        Backend { message: String } => "search metrics backend failed: {message}",
    }
}

/// How a search ended, for counting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// Served from cache.
    CacheHit,
    /// Computed after a cache miss.
    CacheMiss,
    /// The provider failed or timed out.
    ProviderFailure,
}

/// Point-in-time counter values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Searches that passed validation.
    pub total_requests: u64,
    /// Searches answered from cache.
    pub cache_hits: u64,
    /// Searches that missed the cache.
    pub cache_misses: u64,
    /// Searches aborted by provider failures.
    pub provider_failures: u64,
    /// Searches per resolved category label.
    pub per_category: BTreeMap<String, u64>,
}

/// Metrics recording port for search counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchMetrics: Send + Sync {
    /// Count one validated search for `category`.
    async fn record_request(&self, category: &str) -> Result<(), SearchMetricsError>;

    /// Count how a search ended.
    async fn record_event(&self, event: SearchEvent) -> Result<(), SearchMetricsError>;

    /// Read the current counters.
    async fn snapshot(&self) -> Result<MetricsSnapshot, SearchMetricsError>;
}

/// Metrics sink that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSearchMetrics;

#[async_trait]
impl SearchMetrics for NoOpSearchMetrics {
    async fn record_request(&self, _category: &str) -> Result<(), SearchMetricsError> {
        Ok(())
    }

    async fn record_event(&self, _event: SearchEvent) -> Result<(), SearchMetricsError> {
        Ok(())
    }

    async fn snapshot(&self) -> Result<MetricsSnapshot, SearchMetricsError> {
        Ok(MetricsSnapshot::default())
    }
}
