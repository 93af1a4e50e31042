//! The RPC capability every endpoint exposes, and how clients are built.
//!
//! # Responsibilities
//! - Define the object-safe `RpcClient` trait (tip height + raw request)
//! - Build clients from addresses via `ClientFactory`
//! - Pick the concrete transport from configuration

use futures_util::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::evm::EvmClient;
use crate::blockchain::json_rpc::JsonRpcClient;
use crate::blockchain::types::RpcResult;
use crate::config::{ClientConfig, ClientKind};

/// Network calls an endpoint can serve.
///
/// Failures are reported as [`RpcError`](crate::blockchain::RpcError) without
/// distinguishing transports.
pub trait RpcClient: Send + Sync + fmt::Debug {
    /// Current tip height (slot or block number) as seen by this endpoint.
    fn tip_height(&self) -> BoxFuture<'_, RpcResult<u64>>;

    /// Execute an arbitrary JSON-RPC request.
    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, RpcResult<Value>>;
}

/// Creates clients for endpoint addresses.
pub trait ClientFactory: Send + Sync {
    fn connect(&self, address: &str) -> RpcResult<Arc<dyn RpcClient>>;
}

/// Factory for real HTTP transports.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    config: ClientConfig,
    http: reqwest::Client,
}

impl HttpClientFactory {
    pub fn new(config: ClientConfig) -> RpcResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| crate::blockchain::RpcError::Transport(e.to_string()))?;
        Ok(Self { config, http })
    }
}

impl ClientFactory for HttpClientFactory {
    fn connect(&self, address: &str) -> RpcResult<Arc<dyn RpcClient>> {
        let client: Arc<dyn RpcClient> = match self.config.kind {
            ClientKind::JsonRpc => Arc::new(JsonRpcClient::new(
                address,
                self.http.clone(),
                self.config.tip_method.clone(),
            )?),
            ClientKind::Evm => Arc::new(EvmClient::new(address)?),
        };
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_rejects_invalid_address() {
        let factory = HttpClientFactory::new(ClientConfig::default()).unwrap();
        assert!(factory.connect("not a url").is_err());
        assert!(factory.connect("http://127.0.0.1:8899").is_ok());
    }

    #[test]
    fn test_factory_builds_evm_client() {
        let config = ClientConfig {
            kind: ClientKind::Evm,
            ..ClientConfig::default()
        };
        let factory = HttpClientFactory::new(config).unwrap();
        let client = factory.connect("http://127.0.0.1:8545").unwrap();
        assert!(format!("{client:?}").contains("EvmClient"));
    }
}
