//! Errors surfaced to callers of the manager.

use thiserror::Error;

use crate::blockchain::RpcError;
use crate::config::ConfigError;

/// Failures that cross the manager's API boundary.
///
/// Probe and hosts-file failures never appear here; they are absorbed and
/// logged where they happen.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot connect to reference endpoint {address}: {source}")]
    Reference {
        address: String,
        #[source]
        source: RpcError,
    },

    #[error("no RPC endpoint available for network '{network}'")]
    NoEndpointAvailable { network: String },

    #[error("all {attempts} attempts failed for network '{network}': {last}")]
    RetriesExhausted {
        network: String,
        attempts: u32,
        #[source]
        last: RpcError,
    },

    #[error("manager has been disposed")]
    Disposed,
}

impl PoolError {
    /// The underlying RPC failure of the final attempt, if any.
    pub fn last_rpc_error(&self) -> Option<&RpcError> {
        match self {
            PoolError::RetriesExhausted { last, .. } => Some(last),
            PoolError::Reference { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for manager operations.
pub type PoolResult<T> = Result<T, PoolError>;
