//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define framework metrics (requests, latency, parameter binding)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `actionmap_requests_total` (counter): requests by method, status, route
//! - `actionmap_request_duration_seconds` (histogram): latency distribution
//! - `actionmap_bindings_total` (counter): binding attempts by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Route label is the resolved route path, never the raw URI

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

pub const REQUESTS_TOTAL: &str = "actionmap_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "actionmap_request_duration_seconds";
pub const BINDINGS_TOTAL: &str = "actionmap_bindings_total";

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!(REQUESTS_TOTAL, "Requests handled, by method, status and route");
    metrics::describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time from request receipt to response"
    );
    metrics::describe_counter!(BINDINGS_TOTAL, "Parameter binding attempts, by outcome");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    counter!(REQUESTS_TOTAL, &labels).increment(1);
    histogram!(REQUEST_DURATION_SECONDS, &labels).record(start.elapsed().as_secs_f64());
}

/// Record one parameter binding attempt.
pub fn record_binding(satisfied: bool) {
    let outcome = if satisfied { "satisfied" } else { "unsatisfied" };
    counter!(BINDINGS_TOTAL, "outcome" => outcome).increment(1);
}
