//! Connection selection.
//!
//! # Policy (in priority order)
//! 1. Uniform random pick from the healthy subset
//! 2. Uniform random pick from all configured endpoints (degraded, warns)
//! 3. Fresh connection to the reference endpoint, not added to the pool
//!
//! Selection never weights by latency or past success.

use rand::seq::SliceRandom;
use std::sync::Arc;

use crate::blockchain::ClientFactory;
use crate::observability::metrics;
use crate::pool::endpoint::Endpoint;
use crate::pool::registry::EndpointRegistry;

/// Which tier of the policy produced an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTier {
    Healthy,
    Degraded,
    Reference,
}

impl SelectionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionTier::Healthy => "healthy",
            SelectionTier::Degraded => "degraded",
            SelectionTier::Reference => "reference",
        }
    }
}

/// Hands out endpoints for calls.
pub struct ConnectionSelector {
    registry: Arc<EndpointRegistry>,
    factory: Arc<dyn ClientFactory>,
    reference_address: String,
}

impl ConnectionSelector {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        factory: Arc<dyn ClientFactory>,
        reference_address: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            factory,
            reference_address: reference_address.into(),
        }
    }

    /// Pick an endpoint for `network`.
    pub fn select(&self, network: &str) -> Option<Arc<Endpoint>> {
        self.select_with_tier(network).map(|(endpoint, _)| endpoint)
    }

    /// Pick an endpoint and report which fallback tier was used.
    pub fn select_with_tier(&self, network: &str) -> Option<(Arc<Endpoint>, SelectionTier)> {
        let snapshot = self.registry.snapshot(network);

        if let Some(endpoint) = pick(&snapshot.healthy) {
            metrics::record_selection(network, SelectionTier::Healthy);
            return Some((endpoint, SelectionTier::Healthy));
        }

        if let Some(endpoint) = pick(&snapshot.all) {
            tracing::warn!(
                network = %network,
                total = snapshot.all.len(),
                address = %endpoint.address(),
                "No healthy endpoints, falling back to an unverified endpoint"
            );
            metrics::record_selection(network, SelectionTier::Degraded);
            return Some((endpoint, SelectionTier::Degraded));
        }

        if self.reference_address.is_empty() {
            tracing::error!(network = %network, "No endpoints configured and no reference endpoint");
            return None;
        }

        match Endpoint::connect(&self.reference_address, self.factory.as_ref()) {
            Ok(endpoint) => {
                tracing::warn!(
                    network = %network,
                    address = %self.reference_address,
                    "No endpoints configured for network, using reference endpoint directly"
                );
                metrics::record_selection(network, SelectionTier::Reference);
                Some((Arc::new(endpoint), SelectionTier::Reference))
            }
            Err(e) => {
                tracing::error!(
                    network = %network,
                    address = %self.reference_address,
                    error = %e,
                    "Failed to connect to reference endpoint"
                );
                None
            }
        }
    }
}

fn pick(endpoints: &[Arc<Endpoint>]) -> Option<Arc<Endpoint>> {
    endpoints.choose(&mut rand::thread_rng()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{endpoint, FixedClient, MapFactory};
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;

    fn selector_with(registry: Arc<EndpointRegistry>) -> (ConnectionSelector, Arc<MapFactory>) {
        let factory = Arc::new(MapFactory::default());
        factory.insert("http://ref", Arc::new(FixedClient::new(Some(1))));
        let selector = ConnectionSelector::new(registry, factory.clone(), "http://ref");
        (selector, factory)
    }

    #[test]
    fn test_prefers_healthy_subset() {
        let registry = Arc::new(EndpointRegistry::new());
        let all = vec![
            endpoint("http://a", None),
            endpoint("http://b", None),
            endpoint("http://c", None),
        ];
        registry.set_all("devnet", all.clone());
        registry.replace_healthy("devnet", vec![all[0].clone(), all[2].clone()]);

        let (selector, _) = selector_with(registry);
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let (chosen, tier) = selector.select_with_tier("devnet").unwrap();
            assert_eq!(tier, SelectionTier::Healthy);
            assert!(chosen.address() == "http://a" || chosen.address() == "http://c");
            seen.insert(chosen.address().to_string());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_degrades_to_all_endpoints() {
        let registry = Arc::new(EndpointRegistry::new());
        registry.set_all("devnet", vec![endpoint("http://a", None), endpoint("http://b", None)]);

        let (selector, factory) = selector_with(registry);
        for _ in 0..100 {
            let (chosen, tier) = selector.select_with_tier("devnet").unwrap();
            assert_eq!(tier, SelectionTier::Degraded);
            assert!(["http://a", "http://b"].contains(&chosen.address()));
        }
        assert_eq!(factory.connects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_falls_back_to_reference_without_pooling_it() {
        let registry = Arc::new(EndpointRegistry::new());
        let (selector, factory) = selector_with(registry.clone());

        let (chosen, tier) = selector.select_with_tier("unknown").unwrap();
        assert_eq!(tier, SelectionTier::Reference);
        assert_eq!(chosen.address(), "http://ref");
        assert_eq!(factory.connects.load(Ordering::SeqCst), 1);
        assert!(registry.snapshot("unknown").all.is_empty());
    }

    #[test]
    fn test_none_without_reference_address() {
        let registry = Arc::new(EndpointRegistry::new());
        let selector = ConnectionSelector::new(registry, Arc::new(MapFactory::default()), "");
        assert!(selector.select("devnet").is_none());
    }

    #[test]
    fn test_none_when_reference_cannot_connect() {
        let registry = Arc::new(EndpointRegistry::new());
        let selector =
            ConnectionSelector::new(registry, Arc::new(MapFactory::default()), "http://missing");
        assert!(selector.select("devnet").is_none());
    }
}
