//! Tracing setup for processes hosting the engine

use crate::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing pipeline from configuration
///
/// `RUST_LOG` wins over the configured level when set. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_ok() {
        tracing::info!(
            service = %config.service_name,
            "Tracing initialized"
        );
    }
}
