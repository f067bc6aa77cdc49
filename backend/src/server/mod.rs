//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use prometheus::Registry;
use tracing::info;

use nearby::Trace;
use nearby::bootstrap::SearchStack;
#[cfg(debug_assertions)]
use nearby::doc::ApiDoc;
use nearby::inbound::http::admin::prometheus_metrics;
use nearby::inbound::http::configure_api;
use nearby::inbound::http::health::{HealthState, live, ready};
use nearby::inbound::http::state::HttpState;
use nearby::outbound::cache::spawn_sweeper;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    registry: web::Data<Registry>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(registry)
        .wrap(Trace)
        .configure(configure_api)
        .service(prometheus_metrics)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server around a wired search stack.
///
/// Spawns the background cache sweeper and marks the service ready once the
/// listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    stack: SearchStack,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(HttpState::new(stack.service));
    let registry = web::Data::new(stack.registry);
    let ServerConfig {
        bind_addr,
        sweep_interval,
    } = config;

    let server = HttpServer::new(move || {
        build_app(
            server_health_state.clone(),
            http_state.clone(),
            registry.clone(),
        )
    })
    .bind(bind_addr)?
    .run();

    let _sweeper = spawn_sweeper(stack.cache, sweep_interval);
    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
