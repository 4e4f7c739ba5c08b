//! Application service: resolve an instance's identifiers by name.
//!
//! The instance list is the source of truth for UUID and ADB serial; launch
//! output is only a hint. Resolving after every launch has settled keeps a
//! slow launch response from racing a refreshing list.

use tracing::{debug, warn};

use crate::application::ports::InstanceControl;
use crate::domain::instance::{find_instance, parse_instance_list};

/// Look up `name` in a fresh instance list.
///
/// Returns `(uuid, adb_serial)`, or two empty strings when the instance is
/// missing or the list could not be fetched. Matching is exact and
/// case-sensitive; the first match wins.
pub async fn resolve(control: &impl InstanceControl, name: &str) -> (String, String) {
    let raw = match control.list_instances().await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(%name, command = e.command(), "could not list instances: {e}");
            return (String::new(), String::new());
        }
    };
    let records = parse_instance_list(&raw);
    match find_instance(&records, name) {
        Some(record) => {
            debug!(%name, uuid = %record.uuid, serial = %record.bridge_serial, "resolved instance");
            (record.uuid.clone(), record.bridge_serial.clone())
        }
        None => {
            debug!(%name, listed = records.len(), "instance not in list");
            (String::new(), String::new())
        }
    }
}
