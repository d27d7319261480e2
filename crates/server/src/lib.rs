//! dashboard-server library crate
//!
//! Exposes `build_app`, `config` and `state` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod config;
mod error;
pub mod middleware;
mod routes;
pub mod sampler;
pub mod state;

use std::path::Path;

use axum::{Router, handler::HandlerWithoutStateExt, middleware as axum_mw};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

pub use error::AppError;

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(state: AppState, config: &Config) -> Router {
    let static_dir = Path::new(&config.static_dir);

    // Unknown paths, including `/`, fall through to the static directory,
    // then to a JSON 404
    let static_files = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(routes::fallback::not_found.into_service());

    let router = routes::api_routes()
        .fallback_service(static_files)
        .with_state(state.clone());

    apply_layers(router, &state, config)
}

/// Wrap a router in the service's middleware stack.
///
/// Panics are converted to 500s innermost so the metrics middleware sees a
/// completed request for them.
pub fn apply_layers(router: Router, state: &AppState, config: &Config) -> Router {
    // Build CORS layer
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    router
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(axum_mw::from_fn_with_state(
            state.metrics.http.clone(),
            middleware::metrics_middleware,
        ))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
