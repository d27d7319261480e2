pub mod fallback;
pub mod health;
pub mod load;
pub mod metrics;
pub mod stats;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the JSON and metrics routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::check))
        .route("/api/health", get(health::check))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::get))
        .route("/api/stats", get(stats::stats))
        .route("/api/time", get(stats::time))
        .route("/api/random", get(stats::random))
        .route("/api/test-load", get(load::test_load))
        .route("/simulate-load", get(load::simulate_load))
}
