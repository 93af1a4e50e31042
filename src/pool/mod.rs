//! Endpoint pool subsystem.
//!
//! # Data Flow
//! ```text
//! initialize
//!     → registry.rs set_all(network, endpoints)   (once per network)
//!
//! health refresh
//!     → registry.rs replace_healthy(network, list) (atomic swap)
//!
//! call path
//!     → selector.rs select(network)
//!         - network.rs snapshot (lock-free read)
//!         - healthy → degraded → reference fallback
//! ```
//!
//! # Design Decisions
//! - Configured endpoints are immutable after initialization
//! - Only the healthy subset changes, and only wholesale
//! - Unknown networks read as empty, never as errors

pub mod endpoint;
pub mod network;
pub mod registry;
pub mod selector;

pub use endpoint::Endpoint;
pub use network::{NetworkPool, PoolSnapshot};
pub use registry::EndpointRegistry;
pub use selector::{ConnectionSelector, SelectionTier};
