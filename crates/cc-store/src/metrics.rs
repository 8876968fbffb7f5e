//! Store metrics collection.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const STORE_REQUESTS_TOTAL: &str = "cc_store_requests_total";
    pub const STORE_REQUEST_DURATION_MS: &str = "cc_store_request_duration_ms";
    pub const STORE_RETRIES_TOTAL: &str = "cc_store_retries_total";
}

/// Record a store request with its outcome and latency.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    let labels = [
        ("operation", operation.to_string()),
        ("status", status.to_string()),
    ];
    counter!(names::STORE_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::STORE_REQUEST_DURATION_MS, &labels).record(latency_ms);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    let labels = [("operation", operation.to_string())];
    counter!(names::STORE_RETRIES_TOTAL, &labels).increment(1);
}
