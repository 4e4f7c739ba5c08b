//! Instance request, record, and outcome types plus gmsaas output parsing.
//!
//! Pure functions only: no I/O, no async, no process execution.
//!
//! Instance identity is recovered in two phases: the launch output is parsed
//! opportunistically, then every instance is re-resolved by its generated name
//! against the instance list. Launch output is not uniformly structured across
//! gmsaas releases, so the list is the source of truth.

use serde::Deserialize;

use crate::domain::error::TaskError;

/// Prefix of every generated instance name.
pub const INSTANCE_NAME_PREFIX: &str = "instance";

/// Name under which request `index` of run `run_id` is started.
///
/// Names are unique within a run (index) and across concurrent runs (run id).
#[must_use]
pub fn instance_name(run_id: &str, index: usize) -> String {
    format!("{INSTANCE_NAME_PREFIX}_{run_id}_{index}")
}

// ── Value types ───────────────────────────────────────────────────────────────

/// One instance to start. Immutable once planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
    /// Zero-based position in the recipe list.
    pub index: usize,
    /// Recipe UUID the instance is created from.
    pub template_id: String,
    /// Generated instance name, used as the correlation key.
    pub requested_name: String,
    /// Local ADB port; `None` lets gmsaas pick one.
    pub bridge_port: Option<u16>,
}

/// An instance as reported by gmsaas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceRecord {
    pub uuid: String,
    pub name: String,
    pub bridge_serial: String,
}

/// Result of launching one request, before name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub request: ProvisioningRequest,
    pub record: Option<InstanceRecord>,
    pub error: Option<TaskError>,
}

impl TaskOutcome {
    #[must_use]
    pub fn succeeded(request: ProvisioningRequest, record: InstanceRecord) -> Self {
        Self {
            request,
            record: Some(record),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(request: ProvisioningRequest, error: TaskError) -> Self {
        Self {
            request,
            record: None,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Final state of one request after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstance {
    pub name: String,
    /// Empty when the request failed.
    pub uuid: String,
    /// Empty when the request failed or no serial was reported.
    pub bridge_serial: String,
    pub error: Option<TaskError>,
}

/// Aggregated, input-ordered result of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedResult {
    entries: Vec<ResolvedInstance>,
    any_failed: bool,
}

impl AggregatedResult {
    /// Fold resolved entries into a result. `entries` must be in input order.
    #[must_use]
    pub fn from_entries(entries: Vec<ResolvedInstance>) -> Self {
        let any_failed = entries.iter().any(|e| e.error.is_some());
        Self {
            entries,
            any_failed,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[ResolvedInstance] {
        &self.entries
    }

    #[must_use]
    pub fn uuids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.uuid.as_str()).collect()
    }

    #[must_use]
    pub fn bridge_serials(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.bridge_serial.as_str()).collect()
    }

    #[must_use]
    pub fn any_failed(&self) -> bool {
        self.any_failed
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── gmsaas output parsing ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct InstanceEnvelope {
    instance: WireInstance,
}

#[derive(Deserialize)]
struct ListEnvelope {
    instances: Vec<WireInstance>,
}

#[derive(Deserialize)]
struct WireInstance {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    adb_serial: Option<String>,
}

impl From<WireInstance> for InstanceRecord {
    fn from(w: WireInstance) -> Self {
        Self {
            uuid: w.uuid,
            name: w.name,
            bridge_serial: w.adb_serial.unwrap_or_default(),
        }
    }
}

/// Deserialize the first JSON object in `raw`, ignoring anything gmsaas
/// printed around it (warnings land on stderr, which is captured too).
fn first_json<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    let start = raw.find('{')?;
    serde_json::Deserializer::from_str(&raw[start..])
        .into_iter::<T>()
        .next()?
        .ok()
}

/// First line that is a single token (legacy plain-text output). Stdout
/// comes before stderr in `raw`, so trailing notices are skipped.
fn first_token(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.contains(char::is_whitespace))
        .map(str::to_owned)
}

/// First whitespace-separated word that parses as a UUID.
fn find_uuid(raw: &str) -> Option<String> {
    raw.split_whitespace()
        .find(|w| uuid::Uuid::parse_str(w).is_ok())
        .map(str::to_owned)
}

/// Parse the output of `gmsaas instances start`.
///
/// JSON clients print an `{"instance": {...}}` envelope; older clients print
/// the bare UUID. Returns `None` when no UUID can be recovered.
#[must_use]
pub fn parse_started_instance(raw: &str, requested_name: &str) -> Option<InstanceRecord> {
    let mut record = match first_json::<InstanceEnvelope>(raw) {
        Some(env) => InstanceRecord::from(env.instance),
        None => InstanceRecord {
            uuid: find_uuid(raw).or_else(|| first_token(raw))?,
            ..InstanceRecord::default()
        },
    };
    if record.uuid.is_empty() {
        return None;
    }
    if record.name.is_empty() {
        requested_name.clone_into(&mut record.name);
    }
    Some(record)
}

/// Parse the ADB serial out of `gmsaas instances adbconnect` output.
#[must_use]
pub fn parse_adb_serial(raw: &str) -> Option<String> {
    match first_json::<InstanceEnvelope>(raw) {
        Some(env) => env.instance.adb_serial.filter(|s| !s.is_empty()),
        None => first_token(raw),
    }
}

/// Parse `gmsaas instances list` output.
///
/// Accepts the JSON `{"instances": [...]}` form, or the text table whose
/// first two lines are a header and a separator, followed by
/// `UUID NAME ADB_SERIAL ...` rows. Rows with fewer than three columns are
/// skipped.
#[must_use]
pub fn parse_instance_list(raw: &str) -> Vec<InstanceRecord> {
    if let Some(list) = first_json::<ListEnvelope>(raw) {
        return list.instances.into_iter().map(InstanceRecord::from).collect();
    }
    raw.lines()
        .skip(2)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let uuid = cols.next()?;
            let name = cols.next()?;
            let serial = cols.next()?;
            Some(InstanceRecord {
                uuid: uuid.to_owned(),
                name: name.to_owned(),
                bridge_serial: serial.to_owned(),
            })
        })
        .collect()
}

/// First record whose name equals `name` exactly.
#[must_use]
pub fn find_instance<'a>(records: &'a [InstanceRecord], name: &str) -> Option<&'a InstanceRecord> {
    records.iter().find(|r| r.name == name)
}
