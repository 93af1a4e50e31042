//! Registry of network pools.
//!
//! # Responsibilities
//! - Map network name → NetworkPool
//! - Initialize each network's endpoints exactly once
//! - Route healthy-subset replacements and snapshots
//! - Refuse further replacements once sealed (after disposal)

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

use crate::pool::endpoint::Endpoint;
use crate::pool::network::{NetworkPool, PoolSnapshot};

/// Process-wide endpoint state, owned by the manager and shared by handle.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    networks: DashMap<String, Arc<NetworkPool>>,
    /// Writers hold the read side while publishing; `seal` takes the write side.
    sealed: RwLock<bool>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configured endpoints for a network.
    ///
    /// Returns `false` (and leaves the pool untouched) if the network was
    /// already initialized.
    pub fn set_all(&self, network: &str, endpoints: Vec<Arc<Endpoint>>) -> bool {
        match self.networks.entry(network.to_string()) {
            Entry::Occupied(_) => {
                tracing::warn!(network = %network, "Network already initialized, ignoring new endpoint list");
                false
            }
            Entry::Vacant(slot) => {
                tracing::debug!(network = %network, count = endpoints.len(), "Network pool initialized");
                slot.insert(Arc::new(NetworkPool::new(network, endpoints)));
                true
            }
        }
    }

    /// Atomically swap the healthy subset of a network.
    ///
    /// Returns `false` if the network is unknown or the registry is sealed.
    pub fn replace_healthy(&self, network: &str, endpoints: Vec<Arc<Endpoint>>) -> bool {
        let sealed = self.sealed.read().unwrap_or_else(|e| e.into_inner());
        if *sealed {
            tracing::debug!(network = %network, "Registry sealed, discarding health update");
            return false;
        }

        match self.pool(network) {
            Some(pool) => {
                pool.replace_healthy(endpoints);
                true
            }
            None => {
                tracing::warn!(network = %network, "Health update for unknown network");
                false
            }
        }
    }

    /// Current `(all, healthy)` for a network; empty for unknown networks.
    pub fn snapshot(&self, network: &str) -> PoolSnapshot {
        self.pool(network)
            .map(|pool| pool.snapshot())
            .unwrap_or_default()
    }

    pub fn pool(&self, network: &str) -> Option<Arc<NetworkPool>> {
        self.networks.get(network).map(|entry| entry.value().clone())
    }

    /// Names of all initialized networks, sorted.
    pub fn networks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.networks.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Stop accepting healthy-subset replacements. Idempotent.
    ///
    /// Once this returns, no replacement is in progress and none will follow.
    pub fn seal(&self) {
        let mut sealed = self.sealed.write().unwrap_or_else(|e| e.into_inner());
        *sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        *self.sealed.read().unwrap_or_else(|e| e.into_inner())
    }
}
