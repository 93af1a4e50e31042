//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race an RPC operation against a deadline
//!
//! # Design Decisions
//! - The operation runs as its own task; on timeout the handle is dropped,
//!   which detaches the task instead of cancelling it. A timed-out request may
//!   still complete at the transport level; its outcome is discarded.
//! - Timeout errors are distinct from other errors (`RpcError::Timeout`)

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::{RpcError, RpcResult};

/// Await `operation` for at most `limit`.
pub async fn race_timeout<T, Fut>(operation: Fut, limit: Duration) -> RpcResult<T>
where
    Fut: Future<Output = RpcResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(operation);
    match timeout(limit, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(RpcError::Aborted(join_error.to_string())),
        Err(_) => Err(RpcError::Timeout(limit)),
    }
}
