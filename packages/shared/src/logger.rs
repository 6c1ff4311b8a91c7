//! Logging setup utilities for the Streamcircle services.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the calling crate, the binary and `tower_http` request
/// traces. `RUST_LOG` overrides it entirely when set.
///
/// # Arguments
///
/// * `crate_name` - The library crate emitting most events (e.g., "streamcircle_server")
/// * `binary_name` - The name of the binary (e.g., "streamcircle-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use streamcircle_shared::logger::setup_logger;
///
/// setup_logger("streamcircle_server", "streamcircle-server", "info");
/// ```
pub fn setup_logger(crate_name: &str, binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(crate_name, binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the filter directive used when `RUST_LOG` is not set.
///
/// The binary name is skipped when it normalizes to the crate name.
fn default_filter(crate_name: &str, binary_name: &str, default_log_level: &str) -> String {
    let mut targets = vec![crate_name.replace('-', "_")];
    let binary_target = binary_name.replace('-', "_");
    if !targets.contains(&binary_target) {
        targets.push(binary_target);
    }
    targets.push("tower_http".to_string());

    targets
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}
