//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! scheduler.rs:
//!     Periodic timer / manual trigger
//!     → prober.rs refresh_all()
//!
//! prober.rs:
//!     Reference tip height (abort cycle on failure)
//!     → every endpoint's tip height, concurrently
//!     → classify: reference - height <= max_block_delay
//!     → snapshot.rs HealthSnapshot
//!     → registry.replace_healthy (atomic)
//! ```
//!
//! # Design Decisions
//! - Every cycle re-evaluates from scratch; no penalties carry over
//! - A failed cycle publishes nothing (stale-but-known beats empty)
//! - Health state is per-network, swapped wholesale

pub mod prober;
pub mod scheduler;
pub mod snapshot;

pub use prober::{HealthProber, ProbeError};
pub use scheduler::HealthScheduler;
pub use snapshot::{EndpointReport, EndpointStatus, HealthSnapshot};
