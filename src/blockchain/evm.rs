//! Ethereum-compatible transport backed by alloy.

use alloy::providers::{Provider, RootProvider};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;
use url::Url;

use crate::blockchain::client::RpcClient;
use crate::blockchain::types::{RpcError, RpcResult};

/// Client for an EVM JSON-RPC node; tip height is `eth_blockNumber`.
#[derive(Clone)]
pub struct EvmClient {
    url: Url,
    provider: RootProvider,
}

impl EvmClient {
    pub fn new(address: &str) -> RpcResult<Self> {
        let url: Url = address
            .parse()
            .map_err(|_| RpcError::InvalidAddress(address.to_string()))?;
        let provider = RootProvider::new_http(url.clone());
        Ok(Self { url, provider })
    }
}

impl RpcClient for EvmClient {
    fn tip_height(&self) -> BoxFuture<'_, RpcResult<u64>> {
        async move {
            self.provider
                .get_block_number()
                .await
                .map_err(|e| RpcError::Transport(e.to_string()))
        }
        .boxed()
    }

    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, RpcResult<Value>> {
        async move {
            self.provider
                .raw_request::<Value, Value>(method.to_string().into(), params)
                .await
                .map_err(|e| RpcError::Transport(e.to_string()))
        }
        .boxed()
    }
}

impl std::fmt::Debug for EvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmClient").field("url", &self.url.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_address() {
        assert!(matches!(
            EvmClient::new("::nope::"),
            Err(RpcError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_node_fails() {
        // Nothing listens on port 1, so the block number query must fail, not hang.
        let client = EvmClient::new("http://127.0.0.1:1").unwrap();
        assert!(client.tip_height().await.is_err());
    }
}
