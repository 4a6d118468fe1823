//! Metrics definitions for Kennel.
//!
//! This module defines all metrics used throughout the service.
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.
//!
//! Recording happens in adapters and the API layer; the loaders and the
//! pagination engine stay free of side effects.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "upstream_requests_total",
        "Total number of requests sent to the breed data source"
    );
    describe_histogram!(
        "upstream_request_duration_seconds",
        "Time taken by a breed data source request in seconds"
    );
    describe_counter!(
        "favorites_saved_total",
        "Total number of breeds saved as favorite"
    );
    describe_counter!(
        "graphql_requests_total",
        "Total number of GraphQL operations executed"
    );
}

/// Record an upstream request.
///
/// # Arguments
/// * `endpoint` - Logical endpoint ("breeds_list" or "breed_images")
/// * `outcome` - "success", "not_found" or "error"
pub fn record_upstream_request(endpoint: &'static str, outcome: &'static str) {
    counter!("upstream_requests_total", "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

/// Record upstream request duration.
pub fn record_upstream_duration(endpoint: &'static str, duration_secs: f64) {
    histogram!("upstream_request_duration_seconds", "endpoint" => endpoint).record(duration_secs);
}

/// Record a breed saved as favorite.
pub fn record_favorite_saved() {
    counter!("favorites_saved_total").increment(1);
}

/// Record an executed GraphQL operation.
///
/// # Arguments
/// * `transport` - "http" or "invocation"
/// * `has_errors` - Whether the response carried errors
pub fn record_graphql_request(transport: &'static str, has_errors: bool) {
    let status = if has_errors { "error" } else { "ok" };
    counter!("graphql_requests_total", "transport" => transport, "status" => status).increment(1);
}

/// A timer that records upstream request duration when dropped.
pub struct UpstreamTimer {
    endpoint: &'static str,
    start: Instant,
}

impl UpstreamTimer {
    /// Start a new timer for `endpoint`.
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
        }
    }
}

impl Drop for UpstreamTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_upstream_duration(self.endpoint, duration);
    }
}
