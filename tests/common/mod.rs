#![allow(dead_code)]
//! Shared integration test utilities.

use std::sync::Once;
use std::time::Duration;

static INIT_LOGGING: Once = Once::new();

/// Generous ceiling for waiting on background threads in tests.
pub const WAIT_CEILING: Duration = Duration::from_secs(5);

/// Installs a tracing subscriber once per test process.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}
