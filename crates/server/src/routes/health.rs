//! Health and readiness endpoints

use axum::{Json, extract::State};
use dashboard_core::{now_rfc3339, process};
use serde::Serialize;

use crate::state::AppState;

/// Memory usage in whole megabytes, e.g. `"42 MB"`
#[derive(Serialize)]
pub struct MemoryReport {
    rss: String,
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    uptime: f64,
    timestamp: String,
    memory: MemoryReport,
    environment: String,
    active_users: i64,
    system_load: String,
}

/// Readiness response
#[derive(Serialize)]
pub struct ReadyResponse {
    status: &'static str,
    timestamp: String,
}

/// GET /health, /api/health - Report liveness with the latest sampled values
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = process::snapshot().unwrap_or_default();
    let system = &state.metrics.system;

    Json(HealthResponse {
        status: "healthy",
        uptime: state.uptime().as_secs_f64(),
        timestamp: now_rfc3339(),
        memory: MemoryReport {
            rss: process::format_megabytes(snapshot.resident_bytes),
        },
        environment: state.environment.to_string(),
        active_users: system.active_users(),
        system_load: format!("{:.2}", system.system_load()),
    })
}

/// GET /ready - The server accepts traffic as soon as it is listening
pub async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready",
        timestamp: now_rfc3339(),
    })
}
