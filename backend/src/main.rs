//! Backend entry-point: loads settings, wires the search service, and serves
//! REST endpoints and OpenAPI docs.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use nearby::bootstrap::build_search_stack;
use nearby::inbound::http::health::HealthState;
use nearby::settings::NearbySettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = NearbySettings::load().map_err(|e| {
        error!(error = %e, "failed to load configuration");
        std::io::Error::other(e.to_string())
    })?;
    let config = ServerConfig::from_settings(&settings).map_err(std::io::Error::other)?;
    let stack = build_search_stack(&settings).map_err(|e| {
        error!(error = %e, "failed to build search service");
        std::io::Error::other(e.to_string())
    })?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), stack, config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
