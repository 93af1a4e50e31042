//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the endpoint
//! pool. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the RPC failover manager.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Network used when a call does not name one (e.g., "mainnet-beta").
    pub default_network: String,

    /// Reference endpoint treated as ground truth for tip height.
    pub official_rpc_endpoint: String,

    /// Maximum tip-height lag behind the reference before an endpoint is unhealthy.
    pub max_block_delay: u64,

    /// Interval between scheduled health refreshes in milliseconds.
    pub health_check_interval_ms: u64,

    /// Deadline for each individual tip-height query during a refresh.
    pub probe_timeout_ms: u64,

    /// Per-attempt timeout for executed operations in milliseconds.
    pub default_timeout_ms: u64,

    /// Number of attempts made by `execute_with_retry` when not overridden.
    pub default_max_retries: u32,

    /// Optional JSON file holding an array of endpoint addresses.
    pub rpc_hosts_file_path: Option<PathBuf>,

    /// Extra endpoint addresses supplied directly.
    pub custom_rpc_endpoints: Vec<String>,

    /// Log verbosity: 0=off, 1=error, 2=warn, 3=info, 4=debug.
    pub log_level: u8,

    /// RPC transport settings.
    pub client: ClientConfig,

    /// Prometheus exporter bind address. Disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            default_network: "mainnet-beta".to_string(),
            official_rpc_endpoint: "https://api.mainnet-beta.solana.com".to_string(),
            max_block_delay: 30,
            health_check_interval_ms: 30_000,
            probe_timeout_ms: 5_000,
            default_timeout_ms: 10_000,
            default_max_retries: 3,
            rpc_hosts_file_path: None,
            custom_rpc_endpoints: Vec::new(),
            log_level: 3,
            client: ClientConfig::default(),
            metrics_address: None,
        }
    }
}

impl PoolConfig {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

/// Which wire protocol to speak to endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    /// Plain JSON-RPC 2.0 over HTTP (Solana-style `getSlot`).
    #[default]
    JsonRpc,
    /// Ethereum-compatible node via alloy (`eth_blockNumber`).
    Evm,
}

/// RPC transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub kind: ClientKind,

    /// JSON-RPC method returning the current tip height. Ignored for `evm`.
    pub tip_method: String,

    /// Transport-level request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            kind: ClientKind::JsonRpc,
            tip_method: "getSlot".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}
