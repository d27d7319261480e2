//! Prometheus metrics endpoint

use axum::{extract::State, http::header, response::IntoResponse};
use dashboard_core::TEXT_CONTENT_TYPE;

use crate::error::AppError;
use crate::state::AppState;

/// GET /metrics - Render the registry in Prometheus text format
pub async fn get(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state
        .metrics
        .system
        .set_uptime(state.uptime().as_secs_f64());

    let body = state.metrics.registry.render()?;
    Ok(([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body))
}
