//! Application service: start a fleet of instances concurrently.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! Every request runs as its own future and all are polled together with no
//! concurrency cap; the fan-out equals the recipe count. This is fine for
//! the handful of devices a CI run needs. Larger fleets would need a bounded
//! pool in front of `launch`.

use anyhow::Result;
use futures_util::future::join_all;
use tracing::{info, warn};

use crate::application::ports::{InstanceControl, ProgressReporter};
use crate::application::services::correlate::resolve;
use crate::application::services::launch::launch;
use crate::domain::{AggregatedResult, FleetSpec, ResolvedInstance, TaskError, TaskOutcome};

/// Start every instance in `fleet`, then resolve each one by name.
///
/// Per-instance failures never abort the run; they show up as empty
/// entries and set [`AggregatedResult::any_failed`].
///
/// # Errors
///
/// Returns an error, before any command runs, if the port list does not
/// match the recipe list.
pub async fn provision(
    control: &impl InstanceControl,
    reporter: &impl ProgressReporter,
    fleet: &FleetSpec,
) -> Result<AggregatedResult> {
    let requests = fleet.plan_requests()?;
    let total = requests.len();

    reporter.step(&format!(
        "starting {total} Android instance(s) on Genymotion SaaS..."
    ));
    info!(total, run_id = %fleet.run_id, "launching instances");

    // join_all yields outcomes in request order whatever the completion order.
    let outcomes: Vec<TaskOutcome> =
        join_all(requests.into_iter().map(|request| launch(control, request))).await;

    let mut entries = Vec::with_capacity(total);
    for outcome in outcomes {
        entries.push(settle(control, outcome).await);
    }

    let result = AggregatedResult::from_entries(entries);
    if result.any_failed() {
        reporter.warn(&format!(
            "{} of {total} instance(s) failed",
            result.failed_count()
        ));
    } else {
        reporter.success(&format!("{total} instance(s) started"));
    }
    Ok(result)
}

/// Resolve one launch outcome against the instance list.
///
/// Successful launches are resolved again because launch output may lack the
/// serial. The listing wins; the serial adbconnect reported fills in when
/// the listing has none for the same UUID. Failed launches are resolved too
/// so an instance left running without ADB is reported, but their entries
/// stay empty.
async fn settle(control: &impl InstanceControl, outcome: TaskOutcome) -> ResolvedInstance {
    let TaskOutcome {
        request,
        record,
        error,
    } = outcome;
    let index = request.index;
    let name = request.requested_name;

    info!(index, %name, state = "resolving", "resolving instance");
    let (uuid, listed_serial) = resolve(control, &name).await;
    let bridge_serial = match record {
        Some(launched) if listed_serial.is_empty() && !uuid.is_empty() && launched.uuid == uuid => {
            launched.bridge_serial
        }
        _ => listed_serial,
    };

    let error = match error {
        Some(err) => {
            if !uuid.is_empty() {
                warn!(index, %name, %uuid, "instance left running after a failed start");
            }
            Some(err)
        }
        None if uuid.is_empty() => Some(TaskError::Unresolved { name: name.clone() }),
        None => None,
    };

    match error {
        Some(err) => {
            warn!(index, %name, state = "failed", "{err}");
            ResolvedInstance {
                name,
                uuid: String::new(),
                bridge_serial: String::new(),
                error: Some(err),
            }
        }
        None => {
            info!(index, %name, %uuid, serial = %bridge_serial, state = "succeeded", "instance ready");
            ResolvedInstance {
                name,
                uuid,
                bridge_serial,
                error: None,
            }
        }
    }
}
