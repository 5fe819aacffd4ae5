//! Metrics collection and exposition.
//!
//! # Metrics
//! - `peerlink_accepted_total` (counter): connections returned by the accept primitive
//! - `peerlink_rejected_total` (counter): peers refused by a single-peer tracker
//! - `peerlink_dropped_total` (counter): peers closed for lack of a free slot
//! - `peerlink_retry_exhausted_total` (counter): `connect` calls that gave up
//!
//! Recording goes through the `metrics` facade and costs nothing until a
//! recorder is installed with [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must run inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_accepted() {
    metrics::counter!("peerlink_accepted_total").increment(1);
}

pub fn record_rejected() {
    metrics::counter!("peerlink_rejected_total").increment(1);
}

pub fn record_dropped() {
    metrics::counter!("peerlink_dropped_total").increment(1);
}

pub fn record_retry_exhausted() {
    metrics::counter!("peerlink_retry_exhausted_total").increment(1);
}
