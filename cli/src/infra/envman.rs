//! `EnvironmentExporter` backed by Bitrise's `envman`.

use crate::application::ports::{CommandRunner, EnvironmentExporter};
use crate::domain::ProcessError;
use crate::infra::command_runner::{TokioCommandRunner, invoke};

pub const ENVMAN: &str = "envman";

pub struct EnvmanExporter<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> EnvmanExporter<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl EnvmanExporter<TokioCommandRunner> {
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner)
    }
}

impl<R: CommandRunner> EnvironmentExporter for EnvmanExporter<R> {
    async fn export(&self, key: &str, value: &str) -> Result<(), ProcessError> {
        invoke(
            &self.runner,
            ENVMAN,
            &["add", "--key", key, "--value", value],
        )
        .await
        .map(drop)
    }
}
