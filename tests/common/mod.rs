//! Shared utilities for integration tests.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use rpc_failover::blockchain::{ClientFactory, RpcClient, RpcError, RpcResult};
use rpc_failover::PoolConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a mock endpoint answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Height(u64),
    Fail,
    Hang,
}

/// Programmable endpoint whose behavior can change between health cycles.
#[derive(Debug)]
pub struct MockEndpoint {
    behavior: Mutex<Behavior>,
    pub height_calls: AtomicUsize,
    pub request_calls: AtomicUsize,
}

impl MockEndpoint {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            height_calls: AtomicUsize::new(0),
            request_calls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    fn behavior(&self) -> Behavior {
        *self.behavior.lock().unwrap()
    }

    async fn answer(&self) -> RpcResult<u64> {
        match self.behavior() {
            Behavior::Height(height) => Ok(height),
            Behavior::Fail => Err(RpcError::Transport("connection refused".into())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(RpcError::Transport("woke up".into()))
            }
        }
    }
}

impl RpcClient for MockEndpoint {
    fn tip_height(&self) -> BoxFuture<'_, RpcResult<u64>> {
        self.height_calls.fetch_add(1, Ordering::SeqCst);
        self.answer().boxed()
    }

    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, RpcResult<Value>> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        async move {
            let height = self.answer().await?;
            Ok(json!({ "method": method, "params": params, "height": height }))
        }
        .boxed()
    }
}

/// Factory handing out registered mock endpoints; unknown addresses fail.
#[derive(Default)]
pub struct MockFactory {
    endpoints: Mutex<HashMap<String, Arc<MockEndpoint>>>,
}

impl MockFactory {
    pub fn with(entries: &[(&str, Behavior)]) -> Arc<Self> {
        let factory = Arc::new(Self::default());
        for (address, behavior) in entries {
            factory.add(address, *behavior);
        }
        factory
    }

    pub fn add(&self, address: &str, behavior: Behavior) -> Arc<MockEndpoint> {
        let endpoint = MockEndpoint::new(behavior);
        self.endpoints
            .lock()
            .unwrap()
            .insert(address.to_string(), endpoint.clone());
        endpoint
    }

    pub fn get(&self, address: &str) -> Arc<MockEndpoint> {
        self.endpoints.lock().unwrap()[address].clone()
    }
}

impl ClientFactory for MockFactory {
    fn connect(&self, address: &str) -> RpcResult<Arc<dyn RpcClient>> {
        match self.endpoints.lock().unwrap().get(address) {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Err(RpcError::InvalidAddress(address.to_string())),
        }
    }
}

/// Config for a "testnet" pool whose reference is `http://ref`.
pub fn test_config(custom: &[&str]) -> PoolConfig {
    PoolConfig {
        default_network: "testnet".to_string(),
        official_rpc_endpoint: "http://ref".to_string(),
        custom_rpc_endpoints: custom.iter().map(|s| s.to_string()).collect(),
        max_block_delay: 30,
        health_check_interval_ms: 3_600_000,
        probe_timeout_ms: 100,
        default_timeout_ms: 200,
        default_max_retries: 3,
        ..PoolConfig::default()
    }
}

/// Addresses of the current healthy subset, sorted.
#[allow(dead_code)]
pub fn healthy_addresses(manager: &rpc_failover::RpcManager, network: &str) -> Vec<String> {
    let mut addresses = manager
        .get_stats()
        .networks
        .get(network)
        .map(|stats| stats.healthy_addresses.clone())
        .unwrap_or_default();
    addresses.sort();
    addresses
}
