//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **overpass**: reqwest-backed `PlaceSource` against an Overpass endpoint
//! - **cache**: in-process TTL cache for ranked results
//! - **metrics**: in-process search counters
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod metrics;
pub mod overpass;
