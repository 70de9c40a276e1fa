use std::sync::Mutex;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::trace;

// Global cache for the Prometheus handle used by [`init_metrics_handle`].
//
// A [`Mutex`] is used instead of [`Once`] or [`OnceLock`] because the
// initialization code is fallible and `OnceLock::get_or_try_init` is still
// unstable. Installing the recorder twice fails, and tests call this from
// multiple places, so the handle must be cached after the first install.
static PROMETHEUS_HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// How often the recorder performs upkeep to bound memory growth.
const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Installs the Prometheus metrics recorder and returns a handle for rendering.
///
/// The caller decides where the rendered metrics are exposed; this function
/// only installs the global recorder consumed by the `metrics` macros.
/// Subsequent calls return clones of the cached handle.
pub fn init_metrics_handle() -> Result<PrometheusHandle, BuildError> {
    let mut prometheus_handle = PROMETHEUS_HANDLE.lock().unwrap();

    if let Some(handle) = &*prometheus_handle {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    *prometheus_handle = Some(handle.clone());

    let handle_clone = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(UPKEEP_INTERVAL).await;
            trace!("running metrics upkeep");
            handle_clone.run_upkeep();
        }
    });

    Ok(handle)
}
