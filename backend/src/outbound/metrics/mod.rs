//! Outbound adapters for metrics exporting.
//!
//! Search counters are Prometheus collectors registered with a caller-owned
//! registry; the admin endpoint reads them back as a snapshot.

mod prometheus_search;

pub use prometheus_search::PrometheusSearchMetrics;
