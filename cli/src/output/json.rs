//! JSON output helpers for `--json`.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::AggregatedResult;

#[derive(Serialize)]
struct InstanceView<'a> {
    name: &'a str,
    uuid: &'a str,
    adb_serial: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ResultView<'a> {
    instances: Vec<InstanceView<'a>>,
    failed: usize,
}

/// Pretty-printed JSON summary of a provisioning run.
///
/// ```json
/// {
///   "instances": [
///     { "name": "instance_12_0", "uuid": "...", "adb_serial": "localhost:4321" }
///   ],
///   "failed": 0
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_result(result: &AggregatedResult) -> Result<String> {
    let view = ResultView {
        instances: result
            .entries()
            .iter()
            .map(|e| InstanceView {
                name: &e.name,
                uuid: &e.uuid,
                adb_serial: &e.bridge_serial,
                error: e.error.as_ref().map(ToString::to_string),
            })
            .collect(),
        failed: result.failed_count(),
    };
    serde_json::to_string_pretty(&view).context("JSON serialization failed")
}
