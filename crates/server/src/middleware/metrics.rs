//! Prometheus metrics collection middleware
//!
//! Records `http_requests_total` (counter), `http_request_duration_seconds`
//! (histogram) and `http_requests_in_progress` (gauge) for every request,
//! with method/route/status labels.

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use dashboard_core::HttpMetrics;
use std::time::Instant;

use super::request_id::RequestId;

/// Status recorded when the client goes away before a response exists
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Label the route with the matched pattern, or the raw path when nothing matched.
///
/// Unmatched paths are unbounded in cardinality.
fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// A request between entry and completion.
///
/// Dropping it records the request exactly once: with the response status
/// if [`InFlight::finish`] was called, as 499 if the request future was
/// dropped first.
struct InFlight {
    metrics: HttpMetrics,
    method: String,
    route: String,
    request_id: Option<String>,
    start: Instant,
    status: Option<StatusCode>,
}

impl InFlight {
    fn start(
        metrics: HttpMetrics,
        method: String,
        route: String,
        request_id: Option<String>,
    ) -> Self {
        metrics.request_started();
        Self {
            metrics,
            method,
            route,
            request_id,
            start: Instant::now(),
            status: None,
        }
    }

    fn finish(mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        let status = match self.status {
            Some(status) => status.as_u16(),
            None => {
                tracing::debug!(
                    request_id = self.request_id.as_deref().unwrap_or("unknown"),
                    method = %self.method,
                    route = %self.route,
                    "Request aborted before a response was produced"
                );
                CLIENT_CLOSED_REQUEST
            }
        };

        if let Err(e) = self
            .metrics
            .request_finished(&self.method, &self.route, status, duration)
        {
            tracing::warn!(error = %e, route = %self.route, "Failed to record request metrics");
        }
    }
}

/// Middleware that records request count, duration and concurrency metrics.
pub async fn metrics_middleware(
    State(metrics): State<HttpMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = route_label(&request);
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());

    let in_flight = InFlight::start(metrics, method, route, request_id);
    let response = next.run(request).await;
    in_flight.finish(response.status());

    response
}
