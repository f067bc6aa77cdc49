//! Operator endpoints for the result cache and search counters.
//!
//! ```text
//! POST /api/v1/admin/cache/flush
//! GET  /api/v1/admin/metrics
//! GET  /metrics
//! ```

use actix_web::{HttpResponse, get, post, web};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::{error, info};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::no_store_header;
use crate::inbound::http::schemas::{ErrorSchema, MetricsSnapshotSchema};
use crate::inbound::http::state::HttpState;

/// Drop every cached search result.
#[utoipa::path(
    post,
    path = "/api/v1/admin/cache/flush",
    responses(
        (status = 204, description = "Cache flushed"),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "flushCache"
)]
#[post("/admin/cache/flush")]
pub async fn flush_cache(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let removed = state.search.flush_cache().await?;
    info!(removed, "cache flushed via admin endpoint");
    Ok(HttpResponse::NoContent().finish())
}

/// Read search counters.
#[utoipa::path(
    get,
    path = "/api/v1/admin/metrics",
    responses(
        (status = 200, description = "Search counters", body = MetricsSnapshotSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getSearchMetrics"
)]
#[get("/admin/metrics")]
pub async fn metrics(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let snapshot = state.search.metrics_snapshot().await?;
    Ok(HttpResponse::Ok()
        .insert_header(no_store_header())
        .json(snapshot))
}

/// Expose the registry in the Prometheus text format for scrapers.
#[get("/metrics")]
pub async fn prometheus_metrics(registry: web::Data<Registry>) -> ApiResult<HttpResponse> {
    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    encoder
        .encode(&registry.gather(), &mut body)
        .map_err(|err| {
            error!(error = %err, "failed to encode metrics");
            Error::internal("failed to encode metrics")
        })?;
    Ok(HttpResponse::Ok()
        .insert_header(no_store_header())
        .content_type(encoder.format_type())
        .body(body))
}
