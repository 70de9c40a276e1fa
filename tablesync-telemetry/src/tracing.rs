use std::sync::Once;

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// Guard ensuring test tracing is initialized at most once per process.
static TEST_TRACING: Once = Once::new();

/// Default filter directive when `RUST_LOG` is not set.
const DEFAULT_DIRECTIVE: &str = "info";

/// Initializes the global tracing subscriber for a service binary.
///
/// Respects `RUST_LOG` for filtering and falls back to `info` when unset.
/// Returns an error if a global subscriber was already installed.
pub fn init_tracing(service_name: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .finish()
        .try_init()?;

    info!(service_name, "tracing initialized");

    Ok(())
}

/// Initializes tracing for tests.
///
/// Uses the test writer so output is captured per test, and is safe to call
/// from every test since initialization happens only once per process.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .finish()
            .try_init()
            .ok();
    });
}
