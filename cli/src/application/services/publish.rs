//! Application service: export provisioning results to the pipeline.

use tracing::info;

use crate::application::ports::EnvironmentExporter;
use crate::domain::{AggregatedResult, ExportError};

/// Comma-separated instance UUIDs, in recipe order.
pub const INSTANCE_UUID_KEY: &str = "GMCLOUD_SAAS_INSTANCE_UUID";
/// Comma-separated ADB serials, in recipe order.
pub const INSTANCE_ADB_SERIAL_KEY: &str = "GMCLOUD_SAAS_INSTANCE_ADB_SERIAL_PORT";

/// The `(key, value)` pairs published for `result`.
///
/// Failed instances keep their position as an empty entry so downstream
/// steps can zip the lists against the recipe list.
#[must_use]
pub fn outputs(result: &AggregatedResult) -> [(&'static str, String); 2] {
    [
        (INSTANCE_UUID_KEY, result.uuids().join(",")),
        (INSTANCE_ADB_SERIAL_KEY, result.bridge_serials().join(",")),
    ]
}

/// Export every output. Stops at the first failure.
///
/// # Errors
///
/// Returns [`ExportError`] naming the key that could not be written.
pub async fn export_outputs(
    exporter: &impl EnvironmentExporter,
    result: &AggregatedResult,
) -> Result<(), ExportError> {
    for (key, value) in outputs(result) {
        exporter
            .export(key, &value)
            .await
            .map_err(|cause| ExportError {
                key: key.to_owned(),
                cause,
            })?;
        info!(%key, %value, "exported");
    }
    Ok(())
}
