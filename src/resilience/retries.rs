//! Retry logic.
//!
//! # Responsibilities
//! - Select a fresh endpoint for every attempt
//! - Enforce the per-attempt timeout
//! - Bound the number of attempts
//!
//! # Design Decisions
//! - `max_retries` is the total number of attempts, not retries after the first
//! - Timeouts and operation errors are treated alike: one attempt consumed
//! - No delay between attempts; the next attempt usually lands elsewhere
//! - Failing to select any endpoint ends the call immediately

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::blockchain::{RpcError, RpcResult};
use crate::error::{PoolError, PoolResult};
use crate::observability::metrics;
use crate::pool::endpoint::Endpoint;
use crate::pool::selector::ConnectionSelector;
use crate::resilience::timeouts::race_timeout;

/// Per-call overrides for `execute_with_retry`. Unset fields use config defaults.
#[derive(Debug, Clone, Default)]
pub struct RetryOptions {
    pub network: Option<String>,
    pub max_retries: Option<u32>,
    pub timeout: Option<Duration>,
    pub force_health_check: bool,
}

impl RetryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn force_health_check(mut self, force: bool) -> Self {
        self.force_health_check = force;
        self
    }
}

/// Fully resolved settings for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryContext {
    pub network: String,
    pub max_retries: u32,
    pub timeout: Duration,
}

impl RetryContext {
    /// Fill unset options from defaults. At least one attempt is always made.
    pub fn resolve(
        options: &RetryOptions,
        default_network: &str,
        default_max_retries: u32,
        default_timeout: Duration,
    ) -> Self {
        Self {
            network: options
                .network
                .clone()
                .unwrap_or_else(|| default_network.to_string()),
            max_retries: options.max_retries.unwrap_or(default_max_retries).max(1),
            timeout: options.timeout.unwrap_or(default_timeout),
        }
    }
}

/// Runs caller operations against selected endpoints with bounded retry.
pub struct RetryingExecutor {
    selector: Arc<ConnectionSelector>,
}

impl RetryingExecutor {
    pub fn new(selector: Arc<ConnectionSelector>) -> Self {
        Self { selector }
    }

    pub async fn execute<T, F, Fut>(&self, operation: F, context: &RetryContext) -> PoolResult<T>
    where
        F: Fn(Arc<Endpoint>) -> Fut,
        Fut: Future<Output = RpcResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let network = context.network.as_str();
        let mut last_error: Option<RpcError> = None;

        for attempt in 1..=context.max_retries {
            let Some((endpoint, tier)) = self.selector.select_with_tier(network) else {
                tracing::error!(network = %network, attempt, "No endpoint could be selected");
                return Err(match last_error {
                    Some(last) => PoolError::RetriesExhausted {
                        network: network.to_string(),
                        attempts: attempt - 1,
                        last,
                    },
                    None => PoolError::NoEndpointAvailable {
                        network: network.to_string(),
                    },
                });
            };

            let start = Instant::now();
            match race_timeout(operation(endpoint.clone()), context.timeout).await {
                Ok(value) => {
                    tracing::debug!(
                        network = %network,
                        endpoint = %endpoint.address(),
                        tier = tier.as_str(),
                        attempt,
                        "RPC call succeeded"
                    );
                    metrics::record_attempt(network, "success", start);
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(
                        network = %network,
                        endpoint = %endpoint.address(),
                        attempt,
                        max_attempts = context.max_retries,
                        error = %e,
                        "RPC attempt failed"
                    );
                    let outcome = if e.is_timeout() { "timeout" } else { "error" };
                    metrics::record_attempt(network, outcome, start);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) => {
                tracing::error!(
                    network = %network,
                    attempts = context.max_retries,
                    error = %last,
                    "All RPC attempts failed"
                );
                Err(PoolError::RetriesExhausted {
                    network: network.to_string(),
                    attempts: context.max_retries,
                    last,
                })
            }
            None => Err(PoolError::NoEndpointAvailable {
                network: network.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::registry::EndpointRegistry;
    use crate::testing::{endpoint, MapFactory};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn executor() -> RetryingExecutor {
        let registry = Arc::new(EndpointRegistry::new());
        let all = vec![endpoint("http://a", Some(1)), endpoint("http://b", Some(1))];
        registry.set_all("devnet", all.clone());
        registry.replace_healthy("devnet", all);
        let selector = ConnectionSelector::new(registry, Arc::new(MapFactory::default()), "");
        RetryingExecutor::new(Arc::new(selector))
    }

    fn context(max_retries: u32, timeout_ms: u64) -> RetryContext {
        RetryContext {
            network: "devnet".to_string(),
            max_retries,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let resolved = RetryContext::resolve(
            &RetryOptions::new().max_retries(0),
            "mainnet-beta",
            3,
            Duration::from_secs(1),
        );
        assert_eq!(resolved.network, "mainnet-beta");
        assert_eq!(resolved.max_retries, 1);
        assert_eq!(resolved.timeout, Duration::from_secs(1));

        let resolved = RetryContext::resolve(
            &RetryOptions::new().network("devnet").timeout(Duration::from_millis(5)),
            "mainnet-beta",
            3,
            Duration::from_secs(1),
        );
        assert_eq!(resolved, context(3, 5));
    }

    #[tokio::test]
    async fn test_exactly_max_retries_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: PoolResult<()> = executor()
            .execute(
                move |_| {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    async move { Err(RpcError::Transport(format!("failure {n}"))) }
                },
                &context(3, 100),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(PoolError::RetriesExhausted { attempts, last, .. }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last, RpcError::Transport("failure 3".into()));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stops_after_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = executor()
            .execute(
                move |endpoint| {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        if n == 1 {
                            Err(RpcError::Transport("first fails".into()))
                        } else {
                            Ok(endpoint.address().to_string())
                        }
                    }
                },
                &context(3, 100),
            )
            .await
            .unwrap();

        assert!(result == "http://a" || result == "http://b");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_consumes_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result = executor()
            .execute(
                move |_| {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        if n == 1 {
                            std::future::pending::<()>().await;
                        }
                        Ok(n)
                    }
                },
                &context(3, 50),
            )
            .await
            .unwrap();

        assert_eq!(result, 2);
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_no_endpoint_fails_immediately() {
        let registry = Arc::new(EndpointRegistry::new());
        let selector = ConnectionSelector::new(registry, Arc::new(MapFactory::default()), "");
        let executor = RetryingExecutor::new(Arc::new(selector));
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: PoolResult<()> = executor
            .execute(
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                },
                &context(3, 50),
            )
            .await;

        assert!(matches!(result, Err(PoolError::NoEndpointAvailable { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
