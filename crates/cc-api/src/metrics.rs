//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "cc_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "cc_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "cc_http_requests_in_flight";

    pub const REGISTRATIONS_TOTAL: &str = "cc_registrations_total";
    pub const LOGINS_TOTAL: &str = "cc_logins_total";
    pub const APPLICATIONS_SUBMITTED_TOTAL: &str = "cc_applications_submitted_total";
    pub const JOBS_POSTED_TOTAL: &str = "cc_jobs_posted_total";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "cc_rate_limit_hits_total";
}

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

/// Record a successful registration.
pub fn record_registration(role: &str) {
    let labels = [("role", role.to_string())];
    counter!(names::REGISTRATIONS_TOTAL, &labels).increment(1);
}

/// Record a login attempt outcome.
pub fn record_login(success: bool) {
    let labels = [("outcome", if success { "success" } else { "failure" }.to_string())];
    counter!(names::LOGINS_TOTAL, &labels).increment(1);
}

/// Record a submitted application.
pub fn record_application_submitted() {
    counter!(names::APPLICATIONS_SUBMITTED_TOTAL).increment(1);
}

/// Record a posted job.
pub fn record_job_posted() {
    counter!(names::JOBS_POSTED_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (collapse document ids).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(path, ":id");
    // Application pair ids are "{job_id}_{applicant_id}"
    let path = regex_lite::Regex::new(r"/applications/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/applications/:id");
    let path = regex_lite::Regex::new(r"/jobs/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/jobs/:id");
    let path = regex_lite::Regex::new(r"/users/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/users/:id");
    let path = regex_lite::Regex::new(r"/notifications/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/notifications/:id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/jobs/550e8400-e29b-41d4-a716-446655440000"),
            "/api/jobs/:id"
        );
        assert_eq!(
            sanitize_path("/api/recruiters/applications/job1_user2/status"),
            "/api/recruiters/applications/:id/status"
        );
        assert_eq!(sanitize_path("/api/auth/login"), "/api/auth/login");
    }
}
