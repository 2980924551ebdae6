//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cache_requests_total` (counter): requests by outcome (hit, fetched,
//!   coalesced, invalid_key, upstream_unavailable, store_error)
//! - `cache_request_duration_seconds` (histogram): end-to-end latency,
//!   including any waiter polling
//! - `cache_upstream_attempts_total` (counter): fetch attempts by result
//! - `cache_takeovers_total` (counter): expired entries reclaimed
//! - `cache_requests_aborted_total` (counter): client disconnects by role

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Prometheus metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!("cache_requests_total", "Requests by terminal outcome");
    describe_histogram!(
        "cache_request_duration_seconds",
        "End-to-end request latency in seconds"
    );
    describe_counter!(
        "cache_upstream_attempts_total",
        "Upstream fetch attempts by result"
    );
    describe_counter!(
        "cache_takeovers_total",
        "Expired entries reclaimed by a later request"
    );
    describe_counter!(
        "cache_requests_aborted_total",
        "Requests whose client disconnected before completion, by role"
    );
}

pub fn record_request_outcome(outcome: &'static str) {
    counter!("cache_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_request_duration(start: Instant) {
    histogram!("cache_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_attempt(result: &'static str) {
    counter!("cache_upstream_attempts_total", "result" => result).increment(1);
}

pub fn record_takeover() {
    counter!("cache_takeovers_total").increment(1);
}

pub fn record_aborted_request(role: &'static str) {
    counter!("cache_requests_aborted_total", "role" => role).increment(1);
}
