//! Unit-test doubles shared across modules.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::blockchain::{ClientFactory, RpcClient, RpcError, RpcResult};
use crate::pool::endpoint::Endpoint;

/// Client answering with a fixed height, or failing when `height` is `None`.
#[derive(Debug)]
pub struct FixedClient {
    height: Mutex<Option<u64>>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl FixedClient {
    pub fn new(height: Option<u64>) -> Self {
        Self::with_delay(height, Duration::ZERO)
    }

    pub fn with_delay(height: Option<u64>, delay: Duration) -> Self {
        Self {
            height: Mutex::new(height),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_height(&self, height: Option<u64>) {
        *self.height.lock().unwrap() = height;
    }

    fn current(&self) -> RpcResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (*self.height.lock().unwrap()).ok_or_else(|| RpcError::Transport("connection refused".into()))
    }
}

impl RpcClient for FixedClient {
    fn tip_height(&self) -> BoxFuture<'_, RpcResult<u64>> {
        async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.current()
        }
        .boxed()
    }

    fn request<'a>(&'a self, method: &'a str, _params: Value) -> BoxFuture<'a, RpcResult<Value>> {
        async move {
            let height = self.current()?;
            Ok(json!({ "method": method, "height": height }))
        }
        .boxed()
    }
}

/// Factory returning pre-registered clients by address.
#[derive(Default)]
pub struct MapFactory {
    clients: Mutex<HashMap<String, Arc<FixedClient>>>,
    pub connects: AtomicUsize,
}

impl MapFactory {
    pub fn insert(&self, address: &str, client: Arc<FixedClient>) {
        self.clients.lock().unwrap().insert(address.to_string(), client);
    }
}

impl ClientFactory for MapFactory {
    fn connect(&self, address: &str) -> RpcResult<Arc<dyn RpcClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let client = self.clients.lock().unwrap().get(address).cloned();
        match client {
            Some(client) => Ok(client),
            None => Err(RpcError::InvalidAddress(address.to_string())),
        }
    }
}

pub fn endpoint(address: &str, height: Option<u64>) -> Arc<Endpoint> {
    Arc::new(Endpoint::new(address, Arc::new(FixedClient::new(height))))
}

pub fn addresses(endpoints: &[Arc<Endpoint>]) -> Vec<&str> {
    endpoints.iter().map(|e| e.address()).collect()
}
