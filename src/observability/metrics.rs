//! Metrics collection and exposition.
//!
//! # Metrics
//! - `user_service_http_requests_total` (counter): requests by method, route, status
//! - `user_service_http_request_duration_seconds` (histogram): latency distribution
//! - `user_service_repository_operations_total` (counter): repository calls by op, outcome

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::Label;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("route", route.to_string()),
        Label::new("status", status.to_string()),
    ];
    ::metrics::counter!("user_service_http_requests_total", labels.clone()).increment(1);
    ::metrics::histogram!("user_service_http_request_duration_seconds", labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a repository operation.
pub fn record_repository_op(op: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "user_service_repository_operations_total",
        "op" => op,
        "outcome" => outcome
    )
    .increment(1);
}
