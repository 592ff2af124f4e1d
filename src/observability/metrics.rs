//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirector_requests_total` (counter): requests by outcome, status
//! - `redirector_request_duration_seconds` (histogram): handler latency,
//!   dominated by the geolocation lookup
//! - `redirector_geolocation_failures_total` (counter): failed lookups by kind
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests and
//!   `--check` runs need no setup
//! - Prometheus exposition runs on its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "redirector_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("redirector_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed geolocation lookup.
pub fn record_lookup_failure(kind: &'static str) {
    metrics::counter!("redirector_geolocation_failures_total", "kind" => kind).increment(1);
}
