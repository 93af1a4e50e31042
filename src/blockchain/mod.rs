//! Blockchain RPC integration subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint address (from config)
//!     → client.rs (ClientFactory picks a transport)
//!     → json_rpc.rs (reqwest, JSON-RPC 2.0) or evm.rs (alloy provider)
//!     → RpcClient: tip_height() / request(method, params)
//! ```
//!
//! # Design Decisions
//! - Transports are opaque behind the object-safe `RpcClient` trait
//! - Errors are transport-agnostic (`RpcError`)
//! - No retries here; retry and timeout policy live in `resilience`

pub mod client;
pub mod evm;
pub mod json_rpc;
pub mod types;

pub use client::{ClientFactory, HttpClientFactory, RpcClient};
pub use types::{RpcError, RpcResult};
