//! Logging initialization
//!
//! Simple, non-overengineered logging setup that:
//! - Respects the RUST_LOG environment variable
//! - Falls back to a config-supplied filter
//! - Defaults to "info"
//!
//! # Usage
//!
//! ```rust
//! use app_provisioner::utils::init_logging;
//!
//! init_logging(None); // Uses RUST_LOG or defaults to "info"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging for the provisioner
///
/// RUST_LOG always takes precedence; the config filter applies only when
/// RUST_LOG is unset, and "info" is the final fallback.
///
/// # Arguments
/// * `filter` - Optional log filter from config (e.g., "info",
///   "app_provisioner=debug,app_provisioner::orchestrator=trace")
pub fn init_logging(filter: Option<&str>) {
    let env_filter = resolve_filter(filter);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true) // Include module path - useful for debugging
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()), // Respect NO_COLOR standard
        )
        .with(env_filter)
        .init();
}

/// Initialize logging with JSON output (for production/monitoring)
///
/// Useful when logs need to be parsed by log aggregation systems.
///
/// # Arguments
/// * `filter` - Optional log filter from config. If None, uses RUST_LOG or
///   defaults to "info"
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    let env_filter = resolve_filter(filter);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true) // Include current span context
                .with_span_list(true),
        )
        .with(env_filter)
        .init();
}

fn resolve_filter(filter: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::new("info"),
    }
}
