//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_publish_total` (counter): requests by outcome
//!   (`ok`, `body_error`, `publish_error`)
//! - `bridge_publish_duration_seconds` (histogram): time from request start
//!   to publish result, by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Failure is logged and otherwise ignored; the bridge keeps serving.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one request.
pub fn record_publish(outcome: &'static str, start: Instant) {
    ::metrics::counter!("bridge_publish_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("bridge_publish_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
