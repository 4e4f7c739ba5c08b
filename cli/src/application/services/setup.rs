//! Application service: prepare the gmsaas client before any instance work.
//!
//! Every failure here is fatal: nothing has been started yet, so the run
//! aborts without exporting anything.

use anyhow::Result;
use tracing::info;

use crate::application::ports::{
    ClientInstaller, ClientSetup, EnvironmentExporter, ProgressReporter,
};
use crate::domain::{Credentials, ExportError, SetupError};

/// Extra data gmsaas appends to its user agent so the control plane can tell
/// which CI service drives it.
pub const USER_AGENT_EXTRA_DATA_KEY: &str = "GMSAAS_USER_AGENT_EXTRA_DATA";
pub const USER_AGENT_EXTRA_DATA: &str = "bitrise.io";

pub struct SetupOptions<'a> {
    pub credentials: &'a Credentials,
    pub gmsaas_version: Option<&'a semver::Version>,
    pub android_sdk_path: Option<&'a str>,
}

/// Install (if needed), configure, and log in the control client.
///
/// # Errors
///
/// Returns [`SetupError`] or [`ExportError`] on the first failing step.
pub async fn prepare_client(
    installer: &impl ClientInstaller,
    client: &impl ClientSetup,
    exporter: &impl EnvironmentExporter,
    reporter: &impl ProgressReporter,
    opts: SetupOptions<'_>,
) -> Result<()> {
    ensure_installed(installer, reporter, opts.gmsaas_version).await?;

    reporter.step("configuring Android SDK path...");
    let sdk_path = opts.android_sdk_path.ok_or(SetupError::SdkPathUnset)?;
    client
        .configure_sdk_path(sdk_path)
        .await
        .map_err(SetupError::SdkPath)?;
    reporter.success("Android SDK is configured");

    exporter
        .export(USER_AGENT_EXTRA_DATA_KEY, USER_AGENT_EXTRA_DATA)
        .await
        .map_err(|cause| ExportError {
            key: USER_AGENT_EXTRA_DATA_KEY.to_owned(),
            cause,
        })?;

    reporter.step("logging in to Genymotion SaaS...");
    client
        .login(opts.credentials)
        .await
        .map_err(SetupError::Auth)?;
    reporter.success("logged in to Genymotion SaaS");
    Ok(())
}

async fn ensure_installed(
    installer: &impl ClientInstaller,
    reporter: &impl ProgressReporter,
    version: Option<&semver::Version>,
) -> Result<(), SetupError> {
    if let Some(path) = installer.locate() {
        info!(path = %path.display(), "gmsaas is already installed");
        return Ok(());
    }
    match version {
        Some(v) => reporter.step(&format!("installing gmsaas {v}...")),
        None => reporter.step("installing gmsaas..."),
    }
    installer.install(version).await.map_err(SetupError::Install)?;
    reporter.success("gmsaas has been installed");
    Ok(())
}
