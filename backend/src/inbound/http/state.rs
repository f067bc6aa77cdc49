//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain service and remain testable without I/O.

use std::sync::Arc;

use crate::domain::PlaceSearchService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub search: Arc<PlaceSearchService>,
}

impl HttpState {
    /// Construct state around a shared search service.
    pub fn new(search: Arc<PlaceSearchService>) -> Self {
        Self { search }
    }
}
