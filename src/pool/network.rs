//! Per-network endpoint pool.
//!
//! # Responsibilities
//! - Hold the configured endpoints of one network (set once)
//! - Hold the current healthy subset behind an atomic pointer
//! - Hand out consistent snapshots to readers
//!
//! # Design Decisions
//! - Healthy subset is an `ArcSwap<Vec<_>>`: writers publish a whole new
//!   vector, readers never observe a partially built list
//! - Reads are lock-free

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

use crate::pool::endpoint::Endpoint;

/// Shared list of endpoints.
pub type EndpointList = Arc<Vec<Arc<Endpoint>>>;

/// Consistent view of a network at one instant.
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    pub all: EndpointList,
    pub healthy: EndpointList,
}

/// Endpoints for one logical network.
#[derive(Debug)]
pub struct NetworkPool {
    name: String,
    all: EndpointList,
    healthy: ArcSwap<Vec<Arc<Endpoint>>>,
}

impl NetworkPool {
    /// Create a pool; the healthy subset starts empty until the first refresh.
    pub fn new(name: impl Into<String>, endpoints: Vec<Arc<Endpoint>>) -> Self {
        Self {
            name: name.into(),
            all: Arc::new(endpoints),
            healthy: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn all(&self) -> EndpointList {
        self.all.clone()
    }

    pub fn healthy(&self) -> EndpointList {
        self.healthy.load_full()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            all: self.all(),
            healthy: self.healthy(),
        }
    }

    /// Publish a new healthy subset.
    ///
    /// Entries are resolved to this pool's own endpoints by address; unknown
    /// addresses are dropped.
    /// Returns how many endpoints were published.
    pub fn replace_healthy(&self, candidates: Vec<Arc<Endpoint>>) -> usize {
        let known: HashMap<&str, &Arc<Endpoint>> =
            self.all.iter().map(|e| (e.address(), e)).collect();
        let before = candidates.len();
        let healthy: Vec<Arc<Endpoint>> = candidates
            .iter()
            .filter_map(|e| known.get(e.address()).map(|configured| Arc::clone(configured)))
            .collect();

        if healthy.len() != before {
            tracing::warn!(
                network = %self.name,
                dropped = before - healthy.len(),
                "Ignoring healthy endpoints that are not configured for this network"
            );
        }

        let count = healthy.len();
        self.healthy.store(Arc::new(healthy));
        count
    }
}
