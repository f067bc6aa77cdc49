//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the place search, cache administration, and health endpoints
//! - **Schemas**: Domain type wrappers ([`ErrorSchema`], [`SearchOutcomeSchema`],
//!   [`MetricsSnapshotSchema`]) that provide OpenAPI definitions without
//!   coupling domain types to the utoipa framework
//!
//! The generated specification is served by Swagger UI in debug builds.

use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, MetricsSnapshotSchema, PlaceFlagsSchema, PlaceSchema,
    PriceTierSchema, SearchOutcomeSchema, TimeBucketSchema,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nearby place search API",
        description = "Category-based discovery and ranking of nearby places."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::places::search_places,
        crate::inbound::http::admin::flush_cache,
        crate::inbound::http::admin::metrics,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        SearchOutcomeSchema,
        PlaceSchema,
        PlaceFlagsSchema,
        PriceTierSchema,
        TimeBucketSchema,
        MetricsSnapshotSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "places", description = "Place discovery"),
        (name = "admin", description = "Cache and counter administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
