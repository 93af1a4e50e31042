//! The RPC failover manager.
//!
//! Owns the endpoint registry, prober, scheduler, selector and executor for
//! one process and wires them together. There is no global instance; callers
//! construct a manager and share it by `Arc`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::blockchain::{ClientFactory, HttpClientFactory, RpcResult};
use crate::config::hosts::{load_hosts_or_empty, merge_addresses};
use crate::config::{validate_config, ConfigError, PoolConfig};
use crate::error::{PoolError, PoolResult};
use crate::health::{HealthProber, HealthScheduler, HealthSnapshot, ProbeError};
use crate::pool::{ConnectionSelector, Endpoint, EndpointRegistry};
use crate::resilience::{RetryContext, RetryOptions, RetryingExecutor};

/// Per-network counts exposed by [`RpcManager::get_stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub total_endpoints: usize,
    pub healthy_endpoints: usize,
    pub healthy_addresses: Vec<String>,
}

/// Read-only statistics snapshot, keyed by network name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub networks: BTreeMap<String, NetworkStats>,
}

pub struct RpcManager {
    config: Arc<PoolConfig>,
    registry: Arc<EndpointRegistry>,
    factory: Arc<dyn ClientFactory>,
    prober: Arc<HealthProber>,
    selector: Arc<ConnectionSelector>,
    executor: RetryingExecutor,
    scheduler: Mutex<Option<HealthScheduler>>,
    initialized: AtomicBool,
    disposed: AtomicBool,
}

impl RpcManager {
    /// Create a manager using the HTTP transport selected in `config.client`.
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        let factory = HttpClientFactory::new(config.client.clone()).map_err(|source| {
            PoolError::Reference {
                address: config.official_rpc_endpoint.clone(),
                source,
            }
        })?;
        Self::with_factory(config, Arc::new(factory))
    }

    /// Create a manager with a caller-supplied client factory.
    ///
    /// The registry starts empty; call [`initialize`](Self::initialize) to
    /// load endpoints and start health refreshes.
    pub fn with_factory(config: PoolConfig, factory: Arc<dyn ClientFactory>) -> PoolResult<Self> {
        validate_config(&config).map_err(|errors| PoolError::Config(ConfigError::Validation(errors)))?;

        let registry = Arc::new(EndpointRegistry::new());
        let reference_address = config.official_rpc_endpoint.trim().to_string();

        let prober = HealthProber::connect(
            registry.clone(),
            factory.as_ref(),
            &reference_address,
            config.max_block_delay,
            config.probe_timeout(),
        )
        .map_err(|source| PoolError::Reference {
            address: reference_address.clone(),
            source,
        })?;

        let selector = Arc::new(ConnectionSelector::new(
            registry.clone(),
            factory.clone(),
            reference_address,
        ));

        Ok(Self {
            config: Arc::new(config),
            registry,
            factory,
            prober: Arc::new(prober),
            executor: RetryingExecutor::new(selector.clone()),
            selector,
            scheduler: Mutex::new(None),
            initialized: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    /// Load endpoints, run one health refresh, and start the scheduler.
    ///
    /// Must be called from within a Tokio runtime. A second call is a no-op.
    pub async fn initialize(&self) -> PoolResult<()> {
        self.initialize_with(true).await
    }

    /// Like [`initialize`](Self::initialize) but without the periodic
    /// scheduler; health only changes on explicit refresh.
    pub async fn initialize_without_scheduler(&self) -> PoolResult<()> {
        self.initialize_with(false).await
    }

    async fn initialize_with(&self, start_scheduler: bool) -> PoolResult<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(PoolError::Disposed);
        }
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::warn!("RpcManager already initialized");
            return Ok(());
        }

        let network = self.config.default_network.clone();
        let from_file = self
            .config
            .rpc_hosts_file_path
            .as_deref()
            .map(load_hosts_or_empty)
            .unwrap_or_default();
        let addresses = merge_addresses(
            &self.config.custom_rpc_endpoints,
            &from_file,
            &self.config.official_rpc_endpoint,
        );

        let endpoints = self.connect_all(&addresses);
        tracing::info!(
            network = %network,
            configured = addresses.len(),
            connected = endpoints.len(),
            reference = %self.config.official_rpc_endpoint,
            "Initializing endpoint pool"
        );
        self.registry.set_all(&network, endpoints);

        self.prober.refresh_all().await;

        // `dispose` flips `disposed` under this lock, so the check and the
        // start cannot interleave with it.
        let mut scheduler = self.lock_scheduler();
        if self.disposed.load(Ordering::SeqCst) {
            tracing::warn!("RpcManager disposed during initialization");
            return Err(PoolError::Disposed);
        }
        if start_scheduler {
            *scheduler = Some(HealthScheduler::start(
                self.prober.clone(),
                self.config.health_check_interval(),
            ));
        }
        Ok(())
    }

    fn connect_all(&self, addresses: &[String]) -> Vec<Arc<Endpoint>> {
        addresses
            .iter()
            .filter_map(|address| match Endpoint::connect(address, self.factory.as_ref()) {
                Ok(endpoint) => Some(Arc::new(endpoint)),
                Err(e) => {
                    tracing::warn!(address = %address, error = %e, "Skipping endpoint");
                    None
                }
            })
            .collect()
    }

    /// Pick an endpoint for `network` (default network when `None`).
    pub fn select(&self, network: Option<&str>) -> Option<Arc<Endpoint>> {
        self.selector
            .select(network.unwrap_or(&self.config.default_network))
    }

    /// Run `operation` against selected endpoints with timeout and bounded retry.
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        operation: F,
        options: RetryOptions,
    ) -> PoolResult<T>
    where
        F: Fn(Arc<Endpoint>) -> Fut,
        Fut: Future<Output = RpcResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let context = RetryContext::resolve(
            &options,
            &self.config.default_network,
            self.config.default_max_retries,
            self.config.default_timeout(),
        );

        if options.force_health_check {
            let _ = self.prober.refresh(&context.network).await;
        }

        self.executor.execute(operation, &context).await
    }

    /// Run one refresh cycle for every network now and wait for it.
    pub async fn refresh_health(&self) -> Vec<(String, Result<HealthSnapshot, ProbeError>)> {
        self.prober.refresh_all().await
    }

    /// Ask the scheduler for an extra cycle without waiting for it.
    pub fn trigger_refresh(&self) {
        if let Some(scheduler) = self.lock_scheduler().as_ref() {
            scheduler.trigger();
        }
    }

    pub fn get_stats(&self) -> PoolStats {
        let networks = self
            .registry
            .networks()
            .into_iter()
            .map(|network| {
                let snapshot = self.registry.snapshot(&network);
                let stats = NetworkStats {
                    total_endpoints: snapshot.all.len(),
                    healthy_endpoints: snapshot.healthy.len(),
                    healthy_addresses: snapshot
                        .healthy
                        .iter()
                        .map(|e| e.address().to_string())
                        .collect(),
                };
                (network, stats)
            })
            .collect();
        PoolStats { networks }
    }

    /// Stop health refreshes and freeze the healthy subsets. Idempotent.
    ///
    /// In-flight `execute_with_retry` calls are not cancelled.
    pub fn dispose(&self) {
        let scheduler = {
            let mut slot = self.lock_scheduler();
            if self.disposed.swap(true, Ordering::SeqCst) {
                return;
            }
            slot.take()
        };
        if let Some(scheduler) = scheduler {
            scheduler.stop();
        }
        self.registry.seal();
        tracing::info!("RpcManager disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn lock_scheduler(&self) -> std::sync::MutexGuard<'_, Option<HealthScheduler>> {
        self.scheduler.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for RpcManager {
    fn drop(&mut self) {
        self.dispose();
    }
}
