//! Logging setup for binaries built on stillpoint-core.
//!
//! The library only emits `tracing` events; nothing is printed unless a
//! binary installs a subscriber through [`init`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install a stderr subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level = %config.level, "logging initialized");
    }
}

/// Initialize logging for tests (captured by the test harness).
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
