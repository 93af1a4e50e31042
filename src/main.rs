//! RPC failover daemon and diagnostics CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                         RpcManager                            │
//!   │                                                               │
//!   │  ┌───────────┐  refresh  ┌──────────┐  replace  ┌──────────┐ │
//!   │  │ scheduler │──────────▶│  prober  │──────────▶│ registry │ │
//!   │  └───────────┘           └──────────┘           └────┬─────┘ │
//!   │                                                      │ read  │
//!   │  execute_with_retry ──▶ executor ──▶ selector ◀──────┘       │
//!   │                            │                                  │
//!   │                            ▼                                  │
//!   │                     RpcClient (reqwest / alloy)               │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use rpc_failover::config::{load_config, PoolConfig};
use rpc_failover::lifecycle::signals::wait_for_signal;
use rpc_failover::observability::{logging, metrics};
use rpc_failover::{RetryOptions, RpcManager};

#[derive(Parser)]
#[command(name = "rpc-failover")]
#[command(about = "Health-aware RPC endpoint pool with retry and failover", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network used by `call` (defaults to `default_network` from config).
    #[arg(short, long)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the pool refreshed and log statistics until interrupted
    Run,
    /// Run one health check and print endpoint statistics
    Probe,
    /// Execute one JSON-RPC request through the retrying executor
    Call {
        /// JSON-RPC method name, e.g. getSlot
        method: String,
        /// JSON-encoded params
        #[arg(default_value = "[]")]
        params: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PoolConfig::default(),
    };
    logging::init_logging(config.log_level);

    tracing::info!(
        default_network = %config.default_network,
        reference = %config.official_rpc_endpoint,
        max_block_delay = config.max_block_delay,
        interval_ms = config.health_check_interval_ms,
        "Configuration loaded"
    );

    if let Some(address) = &config.metrics_address {
        match address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %address, "Failed to parse metrics address"),
        }
    }

    let manager = Arc::new(RpcManager::new(config)?);

    match cli.command {
        Commands::Run => {
            manager.initialize().await?;
            print_stats(&manager)?;

            let reporter = {
                let manager = manager.clone();
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(manager.config().health_check_interval());
                    ticker.tick().await;
                    loop {
                        ticker.tick().await;
                        for (network, stats) in manager.get_stats().networks {
                            tracing::info!(
                                network = %network,
                                healthy = stats.healthy_endpoints,
                                total = stats.total_endpoints,
                                "Pool status"
                            );
                        }
                    }
                })
            };

            wait_for_signal().await;
            reporter.abort();
            manager.dispose();
        }
        Commands::Probe => {
            manager.initialize_without_scheduler().await?;
            print_stats(&manager)?;
            manager.dispose();
        }
        Commands::Call { method, params } => {
            let params: serde_json::Value = serde_json::from_str(&params)?;
            manager.initialize_without_scheduler().await?;

            let mut options = RetryOptions::new();
            if let Some(network) = cli.network {
                options = options.network(network);
            }

            let result = manager
                .execute_with_retry(
                    move |endpoint| {
                        let method = method.clone();
                        let params = params.clone();
                        async move { endpoint.client().request(&method, params).await }
                    },
                    options,
                )
                .await;
            manager.dispose();

            println!("{}", serde_json::to_string_pretty(&result?)?);
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_stats(manager: &RpcManager) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(&manager.get_stats())?);
    Ok(())
}
