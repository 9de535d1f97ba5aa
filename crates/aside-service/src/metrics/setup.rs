//! Metrics recorder installation.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

use super::register_service_metrics;

/// Installs a Prometheus recorder and returns the handle used to render it.
///
/// # Errors
///
/// Fails if a global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    // Buckets en segundos: de 100us (cache hit local) a 5s (store lento)
    let handle = PrometheusBuilder::new()
        .set_buckets(&[
            0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ])?
        .install_recorder()?;

    register_service_metrics();
    info!("Metrics system initialized");
    Ok(handle)
}
