//! Load generation endpoints for demonstrating the dashboards

use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{Query, rejection::QueryRejection},
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default loop length for `/api/test-load`
pub const DEFAULT_ITERATIONS: u64 = 1_000_000;

/// Upper bound on the loop length a caller may request
pub const MAX_ITERATIONS: u64 = 50_000_000;

#[derive(Deserialize)]
pub struct TestLoadParams {
    iterations: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestLoadResponse {
    message: &'static str,
    iterations: u64,
    result: f64,
    duration_ms: u128,
}

#[derive(Serialize)]
pub struct SimulateLoadResponse {
    message: &'static str,
    delay: f64,
}

/// GET /api/test-load - Burn CPU on the blocking pool
pub async fn test_load(
    params: Result<Query<TestLoadParams>, QueryRejection>,
) -> Result<Json<TestLoadResponse>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let iterations = params
        .iterations
        .unwrap_or(DEFAULT_ITERATIONS)
        .min(MAX_ITERATIONS);

    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || burn_cpu(iterations)).await?;

    let duration_ms = started.elapsed().as_millis();
    tracing::debug!(iterations, duration_ms = duration_ms as u64, "CPU load test finished");

    Ok(Json(TestLoadResponse {
        message: "CPU load test completed",
        iterations,
        result,
        duration_ms,
    }))
}

/// GET /simulate-load - Respond after a random delay below one second
pub async fn simulate_load() -> Json<SimulateLoadResponse> {
    let delay = rand::thread_rng().gen_range(0.0..1000.0);
    tokio::time::sleep(Duration::from_secs_f64(delay / 1000.0)).await;

    Json(SimulateLoadResponse {
        message: "Load simulated",
        delay,
    })
}

fn burn_cpu(iterations: u64) -> f64 {
    (0..iterations).fold(0.0, |acc, i| acc + std::hint::black_box(i as f64).sqrt())
}
