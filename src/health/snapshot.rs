//! Result of one health refresh cycle.

use std::sync::Arc;

use crate::pool::endpoint::Endpoint;

/// What a single endpoint reported during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointStatus {
    Height(u64),
    Unreachable(String),
}

/// Per-endpoint observation.
#[derive(Debug, Clone)]
pub struct EndpointReport {
    pub endpoint: Arc<Endpoint>,
    pub status: EndpointStatus,
    pub healthy: bool,
}

/// Ephemeral outcome of probing one network. Never persisted.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub network: String,
    pub reference_height: u64,
    /// Reports in configured endpoint order.
    pub reports: Vec<EndpointReport>,
}

impl HealthSnapshot {
    /// Healthy endpoints, preserving configured order.
    pub fn healthy(&self) -> Vec<Arc<Endpoint>> {
        self.reports
            .iter()
            .filter(|r| r.healthy)
            .map(|r| r.endpoint.clone())
            .collect()
    }

    pub fn healthy_count(&self) -> usize {
        self.reports.iter().filter(|r| r.healthy).count()
    }
}

/// Healthy iff the endpoint lags the reference by at most `max_delay`.
/// Endpoints ahead of the reference are healthy.
pub fn is_within_delay(reference_height: u64, height: u64, max_delay: u64) -> bool {
    reference_height.saturating_sub(height) <= max_delay
}
