//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rpc_pool_endpoint_healthy` (gauge): 1=healthy, 0=unhealthy, per endpoint
//! - `rpc_pool_healthy_endpoints` (gauge): healthy subset size per network
//! - `rpc_pool_refresh_total` (counter): refresh cycles by outcome
//! - `rpc_pool_selections_total` (counter): selections by fallback tier
//! - `rpc_pool_attempts_total` (counter): executor attempts by outcome
//! - `rpc_pool_attempt_duration_seconds` (histogram): attempt latency
//!
//! Recording is a no-op until a recorder is installed.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::pool::selector::SelectionTier;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_endpoint_health(network: &str, address: &str, healthy: bool) {
    gauge!(
        "rpc_pool_endpoint_healthy",
        "network" => network.to_string(),
        "endpoint" => address.to_string()
    )
    .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_healthy_count(network: &str, count: usize) {
    gauge!("rpc_pool_healthy_endpoints", "network" => network.to_string()).set(count as f64);
}

pub fn record_refresh(network: &str, outcome: &'static str) {
    counter!(
        "rpc_pool_refresh_total",
        "network" => network.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_selection(network: &str, tier: SelectionTier) {
    counter!(
        "rpc_pool_selections_total",
        "network" => network.to_string(),
        "tier" => tier.as_str()
    )
    .increment(1);
}

pub fn record_attempt(network: &str, outcome: &'static str, start: Instant) {
    counter!(
        "rpc_pool_attempts_total",
        "network" => network.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("rpc_pool_attempt_duration_seconds", "network" => network.to_string())
        .record(start.elapsed().as_secs_f64());
}
