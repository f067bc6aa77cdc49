//! Place discovery and ranking service library.
//!
//! Resolves category tokens to map tags, queries an Overpass-compatible
//! provider with widening bounding boxes, filters by opening hours, and ranks
//! the results. The `nearby` binary serves this over HTTP; `search-places`
//! runs a single search from the command line.

pub mod bootstrap;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
