//! Client-side resilience layer over blockchain RPC endpoints.
//!
//! Keeps a pool of endpoints per network, classifies them healthy or not by
//! comparing tip heights with a reference endpoint, routes calls to healthy
//! endpoints, and retries failed or timed-out calls elsewhere.

pub mod blockchain;
pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod manager;
pub mod observability;
pub mod pool;
pub mod resilience;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PoolConfig;
pub use error::{PoolError, PoolResult};
pub use manager::{NetworkStats, PoolStats, RpcManager};
pub use pool::Endpoint;
pub use resilience::RetryOptions;
