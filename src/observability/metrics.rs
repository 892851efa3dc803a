//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fanout_batches_total` (counter): batches by policy and result
//! - `fanout_batch_duration_seconds` (histogram): batch latency by policy
//! - `fanout_upstream_calls_total` (counter): upstream calls by outcome
//! - `fanout_gateway_requests_total` (counter): HTTP responses by endpoint and status
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// One finished batch.
pub fn record_batch(policy: &'static str, result: &'static str, elapsed: Duration) {
    metrics::counter!("fanout_batches_total", "policy" => policy, "result" => result).increment(1);
    metrics::histogram!("fanout_batch_duration_seconds", "policy" => policy)
        .record(elapsed.as_secs_f64());
}

/// One upstream call reaching a terminal state.
pub fn record_upstream_call(outcome: &'static str) {
    metrics::counter!("fanout_upstream_calls_total", "outcome" => outcome).increment(1);
}

/// One gateway response.
pub fn record_gateway_request(endpoint: &'static str, status: u16) {
    metrics::counter!(
        "fanout_gateway_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
}
