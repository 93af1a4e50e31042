//! Periodic and on-demand health refresh.
//!
//! # Responsibilities
//! - Run the prober for every network on a fixed interval
//! - Run an extra cycle when triggered
//! - Stop idempotently; a cycle already running finishes, no new one starts
//!
//! # Design Decisions
//! - One background task; callers never wait on it and it never waits on them
//! - A trigger that arrives mid-cycle queues exactly one follow-up cycle
//! - Missed ticks are delayed, not burst

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::health::prober::HealthProber;
use crate::lifecycle::Shutdown;

/// Handle to the background refresh task.
pub struct HealthScheduler {
    shutdown: Shutdown,
    trigger: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl HealthScheduler {
    /// Spawn the refresh loop on the current Tokio runtime.
    ///
    /// The first scheduled cycle runs one `interval` after start.
    pub fn start(prober: Arc<HealthProber>, interval: Duration) -> Self {
        let shutdown = Shutdown::new();
        let trigger = Arc::new(Notify::new());

        let handle = tokio::spawn(run(
            prober,
            interval,
            trigger.clone(),
            shutdown.subscribe(),
        ));

        Self {
            shutdown,
            trigger,
            handle,
        }
    }

    /// Request an immediate refresh cycle without waiting for it.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the loop to exit. Calling it again is a no-op.
    ///
    /// The loop polls the signal ahead of its timer, so once an in-flight
    /// cycle completes no further cycle runs and the interval is dropped.
    pub fn stop(&self) {
        if self.shutdown.trigger() {
            tracing::info!("Health scheduler stopping");
        }
    }
}

impl Drop for HealthScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    prober: Arc<HealthProber>,
    interval: Duration,
    trigger: Arc<Notify>,
    mut shutdown: broadcast::Receiver<()>,
) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Health scheduler starting");

    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                tracing::info!("Health scheduler received shutdown signal, exiting loop");
                break;
            }
            _ = ticker.tick() => {
                tracing::debug!("Scheduled health refresh");
            }
            _ = trigger.notified() => {
                tracing::debug!("On-demand health refresh");
            }
        }

        prober.refresh_all().await;
    }

    tracing::info!("Health scheduler stopped");
}
