//! Metric names emitted by the client, plus a helper to register descriptions
//! with whatever `metrics` recorder the binary installs.

use std::time::Duration;

pub const REQUESTS_TOTAL: &str = "coach_client_requests_total";
pub const REQUEST_SECONDS: &str = "coach_client_request_seconds";

pub fn describe_metrics() {
    metrics::describe_counter!(
        REQUESTS_TOTAL,
        "Requests sent to the coaching API, labelled by endpoint and outcome"
    );
    metrics::describe_histogram!(
        REQUEST_SECONDS,
        metrics::Unit::Seconds,
        "Latency of coaching API requests, including retries"
    );
}

/// Record one finished request.
pub fn record_request(endpoint: &'static str, ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "outcome" => outcome).increment(1);
    metrics::histogram!(REQUEST_SECONDS, "endpoint" => endpoint).record(elapsed.as_secs_f64());
}
