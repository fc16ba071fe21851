//! Logging setup utilities for the Parley chat relay.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// This function sets up logging for the server library crate and the binary.
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "parley-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use parley_shared::logger::setup_logger;
///
/// setup_logger("parley-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "parley_server={level},{bin}={level},tower_http={level}",
                    level = default_log_level,
                    bin = binary_name.replace('-', "_"),
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
