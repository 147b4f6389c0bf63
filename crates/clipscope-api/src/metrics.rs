//! Prometheus metrics for the API server.
//!
//! Pipeline counters (`clipscope_analyses_total` and friends) are recorded by
//! the pipeline crate through the same global recorder.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

/// Install the Prometheus recorder and return the render handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "clipscope_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "clipscope_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "clipscope_http_requests_in_flight";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "clipscope_rate_limit_hits_total";
    pub const USAGE_DENIED_TOTAL: &str = "clipscope_usage_denied_total";
}

static NUMERIC_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[0-9]+(/|$)").expect("valid numeric segment regex"));

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Record a request refused by the usage quota.
pub fn record_usage_denied(operation: &'static str) {
    counter!(names::USAGE_DENIED_TOTAL, "operation" => operation).increment(1);
}

/// Collapse numeric path segments so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    NUMERIC_SEGMENT.replace_all(path, "/:id$1").into_owned()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed().as_secs_f64());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/analyze"), "/api/analyze");
        assert_eq!(sanitize_path("/api/items/42"), "/api/items/:id");
        assert_eq!(sanitize_path("/api/items/42/frames"), "/api/items/:id/frames");
    }
}
