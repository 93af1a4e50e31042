//! Plain JSON-RPC 2.0 transport over HTTP.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

use crate::blockchain::client::RpcClient;
use crate::blockchain::types::{parse_height, RpcError, RpcResult};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client for one endpoint (Solana-style by default).
#[derive(Debug)]
pub struct JsonRpcClient {
    url: Url,
    http: reqwest::Client,
    tip_method: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(address: &str, http: reqwest::Client, tip_method: String) -> RpcResult<Self> {
        let url = Url::parse(address).map_err(|_| RpcError::InvalidAddress(address.to_string()))?;
        Ok(Self {
            url,
            http,
            tip_method,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Transport(format!("request timed out: {e}"))
                } else {
                    RpcError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("HTTP status {status}")));
        }

        let decoded: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        into_result(decoded)
    }
}

fn into_result(response: JsonRpcResponse) -> RpcResult<Value> {
    if let Some(error) = response.error {
        return Err(RpcError::Remote {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| RpcError::InvalidResponse("response has neither result nor error".into()))
}

impl RpcClient for JsonRpcClient {
    fn tip_height(&self) -> BoxFuture<'_, RpcResult<u64>> {
        async move {
            let value = self.call(&self.tip_method, json!([])).await?;
            parse_height(&value)
        }
        .boxed()
    }

    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, RpcResult<Value>> {
        self.call(method, params).boxed()
    }
}
