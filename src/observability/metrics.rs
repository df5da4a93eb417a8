//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_verdicts_total` (counter): verdicts by kind
//! - `gatekeeper_session_outcomes_total` (counter): outcomes by strategy
//! - `gatekeeper_session_lookup_duration_seconds` (histogram): introspection latency
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are low-cardinality static strings

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_verdict(verdict: &'static str) {
    metrics::counter!("gatekeeper_verdicts_total", "verdict" => verdict).increment(1);
}

pub fn record_session_outcome(strategy: &'static str, outcome: &'static str) {
    metrics::counter!(
        "gatekeeper_session_outcomes_total",
        "strategy" => strategy,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_lookup_duration(start: Instant) {
    metrics::histogram!("gatekeeper_session_lookup_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}
