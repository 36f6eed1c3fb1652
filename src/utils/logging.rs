//! Structured logging setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber from the logging configuration.
///
/// The `NETBALL_LOG` environment variable overrides the configured level
/// with a full env-filter directive. Calling this more than once is
/// harmless; later calls are no-ops.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_env("NETBALL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    if result.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
