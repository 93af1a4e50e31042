//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PoolConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! At initialize:
//!     hosts.rs loads the optional hosts file
//!     → merges custom list ∪ file list ∪ reference endpoint
//!     → endpoint addresses for the default network
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - A broken hosts file is logged and contributes zero endpoints

pub mod hosts;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ClientConfig, ClientKind, PoolConfig};
pub use validation::{validate_config, ValidationError};
