//! Chain-agnostic types and error definitions.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to an RPC endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    /// Connection or HTTP-level failure.
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The call did not settle within its deadline.
    #[error("RPC timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The endpoint answered with something we could not interpret.
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// The endpoint returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Remote { code: i64, message: String },

    /// Address could not be turned into a client.
    #[error("Invalid endpoint address '{0}'")]
    InvalidAddress(String),

    /// The operation task panicked or was cancelled.
    #[error("RPC operation aborted: {0}")]
    Aborted(String),
}

impl RpcError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RpcError::Timeout(_))
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Interpret a JSON value as a tip height.
///
/// Accepts plain integers (Solana `getSlot`) and `0x`-prefixed hex strings
/// (Ethereum quantities).
pub fn parse_height(value: &serde_json::Value) -> RpcResult<u64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| RpcError::InvalidResponse(format!("height {n} is not a u64"))),
        serde_json::Value::String(s) => {
            let parsed = match s.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse(),
            };
            parsed.map_err(|e| RpcError::InvalidResponse(format!("height '{s}': {e}")))
        }
        other => Err(RpcError::InvalidResponse(format!(
            "expected numeric height, got {other}"
        ))),
    }
}
