//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`
//! or `crate::output`.

use std::path::PathBuf;
use std::process::Output;

use anyhow::Result;

use crate::domain::{Credentials, ProcessError};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program to completion and capture its output.
    ///
    /// There is no timeout: a hung program hangs the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or waited on.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Control Client Ports ──────────────────────────────────────────────────────

/// Instance operations against the Genymotion SaaS control plane.
///
/// Every method returns the command's combined, trimmed output on success so
/// callers can parse whichever format the installed client emits.
#[allow(async_fn_in_trait)]
pub trait InstanceControl {
    /// Start an instance from `recipe_uuid` named `name`.
    async fn start_instance(&self, recipe_uuid: &str, name: &str) -> Result<String, ProcessError>;
    /// Bind instance `uuid` to a local ADB port; `None` lets gmsaas choose.
    async fn adb_connect(&self, uuid: &str, port: Option<u16>) -> Result<String, ProcessError>;
    /// List every instance visible to the logged-in account.
    async fn list_instances(&self) -> Result<String, ProcessError>;
}

/// One-time client preparation before any instance operation.
#[allow(async_fn_in_trait)]
pub trait ClientSetup {
    /// Persist the Android SDK location in the client configuration.
    async fn configure_sdk_path(&self, path: &str) -> Result<(), ProcessError>;
    /// Authenticate the client.
    async fn login(&self, credentials: &Credentials) -> Result<(), ProcessError>;
}

/// Locates or installs the control client.
#[allow(async_fn_in_trait)]
pub trait ClientInstaller {
    /// Path of the installed client, if any.
    fn locate(&self) -> Option<PathBuf>;
    /// Install the client, pinned to `version` when given.
    async fn install(&self, version: Option<&semver::Version>) -> Result<(), ProcessError>;
}

// ── Pipeline Environment Port ─────────────────────────────────────────────────

/// Publishes key/value pairs to later steps of the calling pipeline.
#[allow(async_fn_in_trait)]
pub trait EnvironmentExporter {
    async fn export(&self, key: &str, value: &str) -> Result<(), ProcessError>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
