//! `ClientInstaller` that finds gmsaas on `PATH` or installs it with pip.

use std::path::PathBuf;

use crate::application::ports::{ClientInstaller, CommandRunner};
use crate::domain::ProcessError;
use crate::infra::command_runner::{TokioCommandRunner, invoke};
use crate::infra::gmsaas::GMSAAS;

pub const PIP: &str = "pip3";

/// pip requirement string for gmsaas, optionally pinned.
#[must_use]
pub fn requirement(version: Option<&semver::Version>) -> String {
    match version {
        Some(v) => format!("{GMSAAS}=={v}"),
        None => GMSAAS.to_owned(),
    }
}

pub struct PipInstaller<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> PipInstaller<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl PipInstaller<TokioCommandRunner> {
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner)
    }
}

impl<R: CommandRunner> ClientInstaller for PipInstaller<R> {
    fn locate(&self) -> Option<PathBuf> {
        which::which(GMSAAS).ok()
    }

    async fn install(&self, version: Option<&semver::Version>) -> Result<(), ProcessError> {
        let requirement = requirement(version);
        invoke(&self.runner, PIP, &["install", requirement.as_str()])
            .await
            .map(drop)
    }
}
