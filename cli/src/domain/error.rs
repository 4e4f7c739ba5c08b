//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Input validation ──────────────────────────────────────────────────────────

/// Errors raised while validating step inputs, before any external command runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No credentials supplied. Set either api_token, or both email and password.")]
    MissingCredentials,

    #[error("Both api_token and email/password were supplied. Use exactly one form.")]
    ConflictingCredentials,

    #[error("Incomplete login: both email and password are required.")]
    IncompleteLogin,

    #[error("No recipe_uuid supplied. Provide one or more comma-separated recipe UUIDs.")]
    MissingTemplates,

    #[error("Empty recipe UUID at position {position} in recipe_uuid list.")]
    EmptyTemplateId { position: usize },

    #[error("Invalid ADB serial port '{value}': expected a number between 1 and 65535.")]
    InvalidPort { value: String },

    #[error(
        "adb_serial_port lists {ports} port(s) but recipe_uuid lists {templates} recipe(s). \
         Leave adb_serial_port empty or give exactly one port per recipe."
    )]
    PortCountMismatch { ports: usize, templates: usize },

    #[error("Invalid gmsaas_version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    #[error("gmsaas_version {value} is not supported: the oldest supported release is {minimum}")]
    UnsupportedVersion { value: String, minimum: String },
}

// ── Process invocation ────────────────────────────────────────────────────────

/// A single external command that could not be started or exited non-zero.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error("failed to start `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("`{command}` failed ({status}) | output: {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },
}

impl ProcessError {
    /// The printable command line that failed.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. } | Self::Failed { command, .. } => command,
        }
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

/// Fatal errors from the steps that prepare the control client.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to install gmsaas: {0}")]
    Install(ProcessError),

    #[error("Please set ANDROID_HOME environment variable")]
    SdkPathUnset,

    #[error("Failed to set android-sdk-path: {0}")]
    SdkPath(ProcessError),

    #[error("Failed to log in with gmsaas: {0}")]
    Auth(ProcessError),
}

// ── Per-instance failures ─────────────────────────────────────────────────────

/// A failure isolated to one provisioning request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("instance '{name}' failed to start: {cause}")]
    Launch { name: String, cause: ProcessError },

    #[error("instance '{name}' started but gmsaas printed no instance UUID: {output}")]
    MissingUuid { name: String, output: String },

    #[error("instance '{name}' ({uuid}) failed to connect to ADB: {cause}")]
    BridgeConnect {
        name: String,
        uuid: String,
        cause: ProcessError,
    },

    #[error("instance '{name}' was not found in the instance list")]
    Unresolved { name: String },
}

// ── Export ────────────────────────────────────────────────────────────────────

/// Writing a value into the pipeline environment failed.
#[derive(Debug, Error)]
#[error("Failed to export {key}: {cause}")]
pub struct ExportError {
    pub key: String,
    pub cause: ProcessError,
}

// ── Verdict ───────────────────────────────────────────────────────────────────

/// Overall verdict of a run whose results were exported.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("{failed} of {total} instance(s) failed to start; partial results were exported")]
    PartialFailure { failed: usize, total: usize },
}
