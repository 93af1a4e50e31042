//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals, timeouts and retries > 0)
//! - Check the reference endpoint is present and parses as a URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PoolConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::PoolConfig;

/// Highest accepted `log_level`.
pub const MAX_LOG_LEVEL: u8 = 4;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("official_rpc_endpoint is empty")]
    MissingReferenceEndpoint,

    #[error("official_rpc_endpoint '{0}' is not a valid URL")]
    InvalidReferenceEndpoint(String),

    #[error("default_network is empty")]
    MissingDefaultNetwork,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("log_level {0} is out of range (0-4)")]
    LogLevel(u8),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &PoolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let reference = config.official_rpc_endpoint.trim();
    if reference.is_empty() {
        errors.push(ValidationError::MissingReferenceEndpoint);
    } else if Url::parse(reference).is_err() {
        errors.push(ValidationError::InvalidReferenceEndpoint(reference.to_string()));
    }

    if config.default_network.trim().is_empty() {
        errors.push(ValidationError::MissingDefaultNetwork);
    }

    let positive = [
        ("health_check_interval_ms", config.health_check_interval_ms),
        ("probe_timeout_ms", config.probe_timeout_ms),
        ("default_timeout_ms", config.default_timeout_ms),
        ("default_max_retries", u64::from(config.default_max_retries)),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(name));
        }
    }

    if config.log_level > MAX_LOG_LEVEL {
        errors.push(ValidationError::LogLevel(config.log_level));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
