//! Simulated diagnostics endpoints

use axum::{Json, extract::State};
use chrono::Utc;
use dashboard_core::{now_rfc3339, process};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    uptime: u64,
    memory_used: u64,
    active_users: i64,
    system_load: String,
    requests_per_minute: u32,
    error_rate: String,
    response_time: String,
}

#[derive(Serialize)]
pub struct TimeResponse {
    timestamp: String,
    unix: i64,
    timezone: &'static str,
}

#[derive(Serialize)]
pub struct RandomResponse {
    value: f64,
    integer: u32,
    uuid: Uuid,
}

/// GET /api/stats - Dashboard numbers, partly real and partly simulated
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = process::snapshot().unwrap_or_default();
    let mut rng = rand::thread_rng();

    Json(StatsResponse {
        uptime: state.uptime().as_secs(),
        memory_used: process::megabytes(snapshot.resident_bytes),
        active_users: state.metrics.system.active_users(),
        system_load: format!("{:.2}", state.metrics.system.system_load()),
        requests_per_minute: rng.gen_range(500..1500),
        error_rate: format!("{:.1}", rng.gen_range(0.0..5.0)),
        response_time: format!("{:.0}", rng.gen_range(50.0..250.0)),
    })
}

/// GET /api/time - Server clock
pub async fn time() -> Json<TimeResponse> {
    Json(TimeResponse {
        timestamp: now_rfc3339(),
        unix: Utc::now().timestamp(),
        timezone: "UTC",
    })
}

/// GET /api/random - Random values for client-side demos
pub async fn random() -> Json<RandomResponse> {
    let mut rng = rand::thread_rng();

    Json(RandomResponse {
        value: rng.gen_range(0.0..1.0),
        integer: rng.gen_range(0..100),
        uuid: Uuid::new_v4(),
    })
}
