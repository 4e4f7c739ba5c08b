//! Application service: start one instance and bind it to ADB.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use tracing::{debug, error, info};

use crate::application::ports::InstanceControl;
use crate::domain::instance::{TaskOutcome, parse_adb_serial, parse_started_instance};
use crate::domain::{ProvisioningRequest, TaskError};

/// Start `request` and connect it to ADB.
///
/// Never returns an error: failures are captured in the outcome so sibling
/// launches keep running. A bridge failure leaves the started instance
/// running; nothing is rolled back.
pub async fn launch(control: &impl InstanceControl, request: ProvisioningRequest) -> TaskOutcome {
    let index = request.index;
    let name = request.requested_name.clone();

    debug!(index, %name, template = %request.template_id, state = "launching", "starting instance");
    let raw = match control
        .start_instance(&request.template_id, &request.requested_name)
        .await
    {
        Ok(raw) => raw,
        Err(cause) => {
            let err = TaskError::Launch { name, cause };
            error!(index, command = err_command(&err), "{err}");
            return TaskOutcome::failed(request, err);
        }
    };

    let Some(mut record) = parse_started_instance(&raw, &request.requested_name) else {
        let err = TaskError::MissingUuid { name, output: raw };
        error!(index, "{err}");
        return TaskOutcome::failed(request, err);
    };
    info!(index, %name, uuid = %record.uuid, "device started");

    debug!(index, %name, port = ?request.bridge_port, state = "bridge-connecting", "connecting ADB");
    match control.adb_connect(&record.uuid, request.bridge_port).await {
        Ok(raw) => {
            if let Some(serial) = parse_adb_serial(&raw) {
                record.bridge_serial = serial;
            }
        }
        Err(cause) => {
            let err = TaskError::BridgeConnect {
                name,
                uuid: record.uuid,
                cause,
            };
            error!(index, command = err_command(&err), "{err}");
            return TaskOutcome::failed(request, err);
        }
    }

    info!(index, %name, serial = %record.bridge_serial, "ADB connected");
    TaskOutcome::succeeded(request, record)
}

fn err_command(err: &TaskError) -> &str {
    match err {
        TaskError::Launch { cause, .. } | TaskError::BridgeConnect { cause, .. } => cause.command(),
        TaskError::MissingUuid { .. } | TaskError::Unresolved { .. } => "",
    }
}
