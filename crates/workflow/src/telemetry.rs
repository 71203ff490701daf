//! Tracing initialization

use cognita_common::config::ObservabilityConfig;
use tracing::Level;

/// Initialize the global tracing subscriber.
///
/// Call once at startup; repeat calls are ignored so tests that share a
/// process do not panic.
pub fn init_tracing(config: &ObservabilityConfig) {
    let level = match config.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_ok() {
        tracing::info!(
            service = %config.service_name,
            version = cognita_common::VERSION,
            "Tracing initialized"
        );
    }
}
