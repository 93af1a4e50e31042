//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → RpcManager::initialize → scheduler running
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → RpcManager::dispose
//!     → scheduler stopped, registry sealed
//!     → in-flight calls finish on their own
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
