//! Logging setup
//!
//! One compact `tracing` subscriber on stderr. The filter directive comes
//! from `RUST_LOG` when set, otherwise from the configuration
//! (`global.debug` forces the debug level, else `global.log_level`).

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Logging configuration error
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to initialize tracing subscriber: {0}")]
    Init(String),
}

/// Initialise the global tracing subscriber.
///
/// Call once, early, before the collaborators start producing log output.
pub fn init(config: &Config) -> Result<(), LoggingError> {
    let default_directive = if config.debug_logging() {
        "debug"
    } else {
        config.log_level().unwrap_or("warn")
    };
    let filter = match std::env::var("RUST_LOG") {
        Ok(directive) if !directive.is_empty() => EnvFilter::new(directive),
        _ => EnvFilter::new(default_directive),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}
