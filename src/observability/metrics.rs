//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lab_route_matches_total` (counter): route lookups by result
//! - `lab_rate_limit_decisions_total` (counter): limiter decisions by outcome
//! - `lab_breaker_transitions_total` (counter): breaker state changes
//! - `lab_tutor_requests_total` (counter): tutor calls by outcome
//! - `lab_sessions_active` (gauge): live sessions
//!
//! Recording is a no-op until a recorder is installed, so engines can be
//! used in tests without any setup.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_route_match(matched: bool) {
    let result = if matched { "matched" } else { "not_found" };
    counter!("lab_route_matches_total", "result" => result).increment(1);
}

pub fn record_rate_limit(decision: &'static str) {
    counter!("lab_rate_limit_decisions_total", "decision" => decision).increment(1);
}

pub fn record_breaker_transition(from: &'static str, to: &'static str) {
    counter!("lab_breaker_transitions_total", "from" => from, "to" => to).increment(1);
}

pub fn record_tutor_request(outcome: &'static str) {
    counter!("lab_tutor_requests_total", "outcome" => outcome).increment(1);
}

pub fn set_active_sessions(count: usize) {
    gauge!("lab_sessions_active").set(count as f64);
}
