//! Integration tests for the health dashboard server.
//!
//! Every test builds its own registry and router, so metric values are never
//! shared between tests. Requests go straight through the Axum router.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
    routing::get,
};
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use dashboard_server::config::Config;
use dashboard_server::middleware::REQUEST_ID_HEADER;
use dashboard_server::sampler::{ACTIVE_USERS_RANGE, Sampler, SYSTEM_LOAD_RANGE};
use dashboard_server::state::AppState;
use dashboard_server::{AppError, apply_layers, build_app};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a configuration pointing at the repository's static directory.
fn test_config() -> Config {
    Config {
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/../../public").to_string(),
        app_name: "test-dashboard".to_string(),
        collect_default_metrics: false,
        ..Config::default()
    }
}

/// Build the app router along with the state it records into.
fn test_app() -> (AppState, Router) {
    let config = test_config();
    let state = AppState::new(&config).expect("Failed to build state");
    let app = build_app(state.clone(), &config);
    (state, app)
}

/// Send a request and return (status, headers, body as text).
async fn request_text(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}

/// Send a request to the app and return (status, body as JSON).
async fn request(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let (status, _, body) = request_text(app, req).await;
    let body = if body.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_str(&body).unwrap_or(JsonValue::Null)
    };

    (status, body)
}

/// Build a GET request.
fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Value of the first series of `name` whose line contains `filter`.
fn metric_value(text: &str, name: &str, filter: &str) -> Option<f64> {
    let labelled = format!("{name}{{");
    let bare = format!("{name} ");

    text.lines()
        .filter(|line| line.starts_with(&labelled) || line.starts_with(&bare))
        .find(|line| line.contains(filter))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

async fn render_metrics(app: &Router) -> String {
    let (status, _, text) = request_text(app, get_req("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    text
}

async fn fail() -> Result<&'static str, AppError> {
    Err(AppError::Internal("forced failure".to_string()))
}

async fn explode() -> &'static str {
    panic!("handler exploded")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let (_state, app) = test_app();

    for uri in ["/health", "/api/health"] {
        let (status, body) = request(&app, get_req(uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "development");
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
        assert!(body["memory"]["rss"].as_str().unwrap().ends_with(" MB"));
        assert!(body["memory"].get("virtual").is_none());
        assert!(body["timestamp"].is_string());
        assert!(body["systemLoad"].is_string());
    }
}

#[tokio::test]
async fn test_ready() {
    let (_state, app) = test_app();

    let (status, body) = request(&app, get_req("/ready")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_not_found() {
    let (state, app) = test_app();

    let (status, body) = request(&app, get_req("/does-not-exist")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["path"], "/does-not-exist");
    assert!(body["timestamp"].is_string());

    // Unmatched paths are labelled with the raw path
    assert_eq!(state.metrics.http.requests_total("GET", "/does-not-exist", 404), 1);
}

#[tokio::test]
async fn test_index_page() {
    let (state, app) = test_app();

    let (status, headers, body) = request_text(&app, get_req("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    assert!(body.contains("Health Dashboard"));
    assert_eq!(state.metrics.http.requests_total("GET", "/", 200), 1);
}

#[tokio::test]
async fn test_index_missing() {
    let config = Config {
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/no-such-dir").to_string(),
        ..test_config()
    };
    let state = AppState::new(&config).unwrap();
    let app = build_app(state.clone(), &config);

    let (status, body) = request(&app, get_req("/")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["path"], "/");
    assert_eq!(state.metrics.http.requests_total("GET", "/", 404), 1);
}

#[tokio::test]
async fn test_request_counted_once() {
    let (state, app) = test_app();
    let http = &state.metrics.http;

    let (status, _) = request(&app, get_req("/api/time")).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(http.requests_total("GET", "/api/time", 200), 1);
    assert_eq!(http.duration_count("GET", "/api/time", 200), 1);
    assert_eq!(http.in_progress(), 0);

    request(&app, get_req("/api/time")).await;
    assert_eq!(http.requests_total("GET", "/api/time", 200), 2);
    assert_eq!(http.duration_count("GET", "/api/time", 200), 2);
}

#[tokio::test]
async fn test_method_and_status_labels() {
    let (state, app) = test_app();

    let req = Request::builder()
        .method("POST")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = request_text(&app, req).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(state.metrics.http.requests_total("POST", "/health", 405), 1);
    assert_eq!(state.metrics.http.requests_total("GET", "/health", 200), 0);
}

#[tokio::test]
async fn test_route_pattern_label() {
    let config = test_config();
    let state = AppState::new(&config).unwrap();
    let router = Router::new().route("/items/{id}", get(|| async { "item" }));
    let app = apply_layers(router, &state, &config);

    for id in ["1", "2", "3"] {
        let (status, _, _) = request_text(&app, get_req(&format!("/items/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(state.metrics.http.requests_total("GET", "/items/{id}", 200), 3);
    assert_eq!(state.metrics.http.requests_total("GET", "/items/1", 200), 0);
}

#[tokio::test]
async fn test_in_progress_restored_after_errors() {
    let config = test_config();
    let state = AppState::new(&config).unwrap();
    let router = Router::new()
        .route("/fail", get(fail))
        .route("/explode", get(explode));
    let app = apply_layers(router, &state, &config);
    let http = &state.metrics.http;

    let before = http.in_progress();

    let (status, body) = request(&app, get_req("/fail")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(http.in_progress(), before);

    let (status, body) = request(&app, get_req("/explode")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(http.in_progress(), before);

    assert_eq!(http.requests_total("GET", "/fail", 500), 1);
    assert_eq!(http.requests_total("GET", "/explode", 500), 1);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (state, app) = test_app();
    request(&app, get_req("/health")).await;

    let (status, headers, text) = request_text(&app, get_req("/metrics")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "text/plain; version=0.0.4; charset=utf-8"
    );

    // One TYPE line per declared metric, in declaration order
    let mut last = 0;
    for name in state.metrics.registry.metric_names() {
        let header = format!("# TYPE {name} ");
        assert_eq!(text.matches(&header).count(), 1, "{name}");
        let at = text.find(&header).unwrap();
        assert!(at >= last, "{name} out of order");
        last = at;
    }

    assert!(text.contains(
        "http_requests_total{method=\"GET\",route=\"/health\",status=\"200\",app=\"test-dashboard\"} 1\n"
    ));
    assert!(metric_value(&text, "app_uptime_seconds", "").unwrap() >= 0.0);
}

#[tokio::test]
async fn test_metrics_render_is_stable() {
    let (_state, app) = test_app();
    request(&app, get_req("/health")).await;

    let first = render_metrics(&app).await;
    let second = render_metrics(&app).await;

    let health = "route=\"/health\",status=\"200\"";
    assert_eq!(
        metric_value(&first, "http_requests_total", health),
        metric_value(&second, "http_requests_total", health)
    );
    assert_eq!(
        metric_value(&first, "http_request_duration_seconds_count", health),
        metric_value(&second, "http_request_duration_seconds_count", health)
    );

    // The /metrics requests themselves only ever add
    let scrape = "route=\"/metrics\",status=\"200\"";
    let after_first = metric_value(&second, "http_requests_total", scrape).unwrap();
    let third = render_metrics(&app).await;
    assert!(metric_value(&third, "http_requests_total", scrape).unwrap() > after_first);
}

#[tokio::test]
async fn test_sampled_gauges_exposed() {
    let (state, app) = test_app();
    let sample = Sampler::new(state.metrics.system.clone(), state.started).sample();

    let text = render_metrics(&app).await;

    let load = metric_value(&text, "system_load_average", "").unwrap();
    let users = metric_value(&text, "active_users_total", "").unwrap();
    assert!(SYSTEM_LOAD_RANGE.contains(&load));
    assert!(ACTIVE_USERS_RANGE.contains(&(users as i64)));
    assert_eq!(users as i64, sample.active_users);

    let (_, body) = request(&app, get_req("/api/health")).await;
    assert_eq!(body["activeUsers"], sample.active_users);
    assert_eq!(body["systemLoad"], format!("{:.2}", sample.system_load));
}

#[tokio::test]
async fn test_stats_time_random() {
    let (_state, app) = test_app();

    let (status, body) = request(&app, get_req("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["memoryUsed"].is_u64());
    assert!(body.get("memoryTotal").is_none());
    let rpm = body["requestsPerMinute"].as_u64().unwrap();
    assert!((500..1500).contains(&rpm));
    let error_rate: f64 = body["errorRate"].as_str().unwrap().parse().unwrap();
    assert!((0.0..=5.0).contains(&error_rate));

    let (status, body) = request(&app, get_req("/api/time")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timezone"], "UTC");
    assert!(body["unix"].as_i64().unwrap() > 0);

    let (status, body) = request(&app, get_req("/api/random")).await;
    assert_eq!(status, StatusCode::OK);
    let value = body["value"].as_f64().unwrap();
    assert!((0.0..1.0).contains(&value));
    assert!(body["integer"].as_u64().unwrap() < 100);
    assert_eq!(body["uuid"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_load_endpoints() {
    let (state, app) = test_app();

    let (status, body) = request(&app, get_req("/api/test-load?iterations=1000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["iterations"], 1000);
    assert!(body["result"].as_f64().unwrap() > 0.0);

    let (status, body) = request(&app, get_req("/simulate-load")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Load simulated");
    let delay = body["delay"].as_f64().unwrap();
    assert!((0.0..1000.0).contains(&delay));

    assert_eq!(state.metrics.http.duration_count("GET", "/simulate-load", 200), 1);
}

#[tokio::test]
async fn test_load_rejects_bad_iterations() {
    let (state, app) = test_app();

    let (status, body) = request(&app, get_req("/api/test-load?iterations=abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].as_str().unwrap().starts_with("Failed to deserialize"));
    assert_eq!(state.metrics.http.requests_total("GET", "/api/test-load", 400), 1);
}

#[tokio::test]
async fn test_request_id() {
    let (_state, app) = test_app();

    let (_, headers, _) = request_text(&app, get_req("/ready")).await;
    let generated = headers[REQUEST_ID_HEADER].to_str().unwrap();
    assert_eq!(generated.len(), 36);

    let req = Request::builder()
        .uri("/ready")
        .header(REQUEST_ID_HEADER, "abc-123")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = request_text(&app, req).await;
    assert_eq!(headers[REQUEST_ID_HEADER], "abc-123");
}
