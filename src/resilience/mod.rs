//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! execute_with_retry(operation, options):
//!     → retries.rs resolve options against config defaults
//!     → per attempt: selector.select(network)
//!     → timeouts.rs race operation vs deadline
//!     → success: return / failure: next attempt
//!     → exhausted: PoolError carrying the last cause
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Timed-out operations are abandoned, not cancelled
//! - Attempts are bounded by the configured count, never count + 1

pub mod retries;
pub mod timeouts;

pub use retries::{RetryContext, RetryOptions, RetryingExecutor};
pub use timeouts::race_timeout;
