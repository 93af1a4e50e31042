//! Tip-height health probing.
//!
//! # Responsibilities
//! - Query the reference endpoint's tip height
//! - Query every configured endpoint concurrently
//! - Classify each endpoint against `max_block_delay`
//! - Publish the healthy subset to the registry
//!
//! # Design Decisions
//! - Reference failure aborts the cycle; the previous subset stays published
//! - Per-endpoint failures only mark that endpoint unhealthy for this cycle
//! - Every query has its own deadline so one dead endpoint cannot stall the rest

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::blockchain::{ClientFactory, RpcError, RpcResult};
use crate::health::snapshot::{is_within_delay, EndpointReport, EndpointStatus, HealthSnapshot};
use crate::observability::metrics;
use crate::pool::endpoint::Endpoint;
use crate::pool::registry::EndpointRegistry;

/// Why a refresh cycle did not publish anything.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("reference endpoint {address} unreachable: {source}")]
    ReferenceUnreachable {
        address: String,
        #[source]
        source: RpcError,
    },

    #[error("network '{0}' has no configured endpoints")]
    UnknownNetwork(String),

    #[error("registry sealed, health update discarded")]
    Sealed,
}

/// Classifies endpoints as healthy or unhealthy.
pub struct HealthProber {
    registry: Arc<EndpointRegistry>,
    reference: Arc<Endpoint>,
    max_block_delay: u64,
    probe_timeout: Duration,
}

impl HealthProber {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        reference: Arc<Endpoint>,
        max_block_delay: u64,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            reference,
            max_block_delay,
            probe_timeout,
        }
    }

    /// Build the prober, connecting to the reference endpoint through `factory`.
    pub fn connect(
        registry: Arc<EndpointRegistry>,
        factory: &dyn ClientFactory,
        reference_address: &str,
        max_block_delay: u64,
        probe_timeout: Duration,
    ) -> RpcResult<Self> {
        let reference = Arc::new(Endpoint::connect(reference_address, factory)?);
        Ok(Self::new(registry, reference, max_block_delay, probe_timeout))
    }

    /// Probe a network without publishing anything.
    pub async fn probe(&self, network: &str) -> Result<HealthSnapshot, ProbeError> {
        let endpoints = self.registry.snapshot(network).all;
        if endpoints.is_empty() {
            return Err(ProbeError::UnknownNetwork(network.to_string()));
        }

        let reference_height = self
            .query(&self.reference)
            .await
            .map_err(|source| ProbeError::ReferenceUnreachable {
                address: self.reference.address().to_string(),
                source,
            })?;

        let results = join_all(endpoints.iter().map(|endpoint| self.query(endpoint))).await;

        let reports = endpoints
            .iter()
            .zip(results)
            .map(|(endpoint, result)| {
                let (status, healthy) = match result {
                    Ok(height) => (
                        EndpointStatus::Height(height),
                        is_within_delay(reference_height, height, self.max_block_delay),
                    ),
                    Err(e) => (EndpointStatus::Unreachable(e.to_string()), false),
                };
                tracing::debug!(
                    network = %network,
                    endpoint = %endpoint.address(),
                    status = ?status,
                    reference_height,
                    healthy,
                    "Endpoint probed"
                );
                metrics::record_endpoint_health(network, endpoint.address(), healthy);
                EndpointReport {
                    endpoint: endpoint.clone(),
                    status,
                    healthy,
                }
            })
            .collect();

        Ok(HealthSnapshot {
            network: network.to_string(),
            reference_height,
            reports,
        })
    }

    /// Probe a network and publish its healthy subset.
    pub async fn refresh(&self, network: &str) -> Result<HealthSnapshot, ProbeError> {
        let snapshot = match self.probe(network).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(network = %network, error = %e, "Health refresh aborted, keeping previous healthy set");
                metrics::record_refresh(network, "aborted");
                return Err(e);
            }
        };

        if !self.registry.replace_healthy(network, snapshot.healthy()) {
            return Err(ProbeError::Sealed);
        }

        let healthy = snapshot.healthy_count();
        tracing::info!(
            network = %network,
            reference_height = snapshot.reference_height,
            healthy,
            total = snapshot.reports.len(),
            "Health refresh complete"
        );
        metrics::record_refresh(network, "published");
        metrics::record_healthy_count(network, healthy);
        Ok(snapshot)
    }

    /// Refresh every initialized network; networks are independent.
    pub async fn refresh_all(&self) -> Vec<(String, Result<HealthSnapshot, ProbeError>)> {
        let networks = self.registry.networks();
        let results = join_all(networks.iter().map(|network| self.refresh(network))).await;
        networks.into_iter().zip(results).collect()
    }

    async fn query(&self, endpoint: &Endpoint) -> RpcResult<u64> {
        match timeout(self.probe_timeout, endpoint.client().tip_height()).await {
            Ok(result) => result,
            Err(_) => Err(RpcError::Timeout(self.probe_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{addresses, endpoint, FixedClient};

    fn prober(registry: Arc<EndpointRegistry>, reference: Arc<Endpoint>) -> HealthProber {
        HealthProber::new(registry, reference, 30, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_classifies_against_reference() {
        let registry = Arc::new(EndpointRegistry::new());
        let reference = endpoint("http://ref", Some(100));
        registry.set_all(
            "devnet",
            vec![
                endpoint("http://a", Some(100)),
                endpoint("http://b", Some(70)),
                endpoint("http://c", Some(69)),
                endpoint("http://d", None),
                endpoint("http://e", Some(140)),
                reference.clone(),
            ],
        );

        let snapshot = prober(registry.clone(), reference).refresh("devnet").await.unwrap();
        assert_eq!(snapshot.reference_height, 100);
        assert_eq!(
            addresses(&registry.snapshot("devnet").healthy),
            vec!["http://a", "http://b", "http://e", "http://ref"]
        );
        assert!(matches!(snapshot.reports[3].status, EndpointStatus::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_reference_failure_keeps_previous_subset() {
        let registry = Arc::new(EndpointRegistry::new());
        let all = vec![endpoint("http://a", Some(5)), endpoint("http://b", Some(5))];
        registry.set_all("devnet", all.clone());
        registry.replace_healthy("devnet", vec![all[1].clone()]);

        let reference = endpoint("http://ref", None);
        let result = prober(registry.clone(), reference).refresh("devnet").await;

        assert!(matches!(result, Err(ProbeError::ReferenceUnreachable { .. })));
        assert_eq!(addresses(&registry.snapshot("devnet").healthy), vec!["http://b"]);
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out_without_blocking_others() {
        let registry = Arc::new(EndpointRegistry::new());
        let slow = Arc::new(Endpoint::new(
            "http://slow",
            Arc::new(FixedClient::with_delay(Some(100), Duration::from_secs(10))),
        ));
        registry.set_all("devnet", vec![slow, endpoint("http://fast", Some(100))]);

        let started = std::time::Instant::now();
        let snapshot = prober(registry.clone(), endpoint("http://ref", Some(100)))
            .refresh("devnet")
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(addresses(&snapshot.healthy()), vec!["http://fast"]);
        assert_eq!(
            snapshot.reports[0].status,
            EndpointStatus::Unreachable(RpcError::Timeout(Duration::from_millis(200)).to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_network_is_not_probed() {
        let registry = Arc::new(EndpointRegistry::new());
        let reference = Arc::new(FixedClient::new(Some(1)));
        let prober = prober(registry, Arc::new(Endpoint::new("http://ref", reference.clone())));

        let result = prober.refresh("nowhere").await;
        assert!(matches!(result, Err(ProbeError::UnknownNetwork(_))));
        assert_eq!(reference.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sealed_registry_reports_sealed() {
        let registry = Arc::new(EndpointRegistry::new());
        registry.set_all("devnet", vec![endpoint("http://a", Some(1))]);
        registry.seal();

        let result = prober(registry.clone(), endpoint("http://ref", Some(1))).refresh("devnet").await;
        assert!(matches!(result, Err(ProbeError::Sealed)));
        assert!(registry.snapshot("devnet").healthy.is_empty());
    }

    #[tokio::test]
    async fn test_each_refresh_starts_from_scratch() {
        let registry = Arc::new(EndpointRegistry::new());
        let client = Arc::new(FixedClient::new(None));
        registry.set_all("devnet", vec![Arc::new(Endpoint::new("http://a", client.clone()))]);
        let prober = prober(registry.clone(), endpoint("http://ref", Some(100)));

        prober.refresh("devnet").await.unwrap();
        assert!(registry.snapshot("devnet").healthy.is_empty());

        client.set_height(Some(95));
        prober.refresh("devnet").await.unwrap();
        assert_eq!(addresses(&registry.snapshot("devnet").healthy), vec!["http://a"]);

        client.set_height(Some(10));
        prober.refresh("devnet").await.unwrap();
        assert!(registry.snapshot("devnet").healthy.is_empty());
    }
}
