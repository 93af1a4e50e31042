//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Map the numeric `log_level` (0-4) onto tracing levels
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level when set
//! - Initialization is idempotent; a second call is ignored

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Numeric verbosity → tracing level filter.
///
/// 0=off, 1=error, 2=warn, 3=info, 4 (and above)=debug.
pub fn level_filter(log_level: u8) -> LevelFilter {
    match log_level {
        0 => LevelFilter::OFF,
        1 => LevelFilter::ERROR,
        2 => LevelFilter::WARN,
        3 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Install the global subscriber.
pub fn init_logging(log_level: u8) {
    let default_directive = format!("rpc_failover={}", level_filter(log_level));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into());

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
