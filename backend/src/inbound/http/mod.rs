//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod cache_control;
pub mod error;
pub mod health;
pub mod places;
pub mod schemas;
pub mod state;

pub use error::ApiResult;

use actix_web::web;

/// Register the versioned API routes under `/api/v1`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(places::search_places)
            .service(admin::flush_cache)
            .service(admin::metrics),
    );
}
