//! gmsaas adapter: routes every control-plane call through a `CommandRunner`.

use crate::application::ports::{ClientSetup, CommandRunner, InstanceControl};
use crate::domain::{Credentials, ProcessError};
use crate::infra::command_runner::{TokioCommandRunner, invoke, invoke_masked};

/// The control client binary.
pub const GMSAAS: &str = "gmsaas";

/// Infrastructure adapter for the gmsaas CLI.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes. Instance commands request JSON output;
/// parsers in `domain::instance` also accept the plain-text format of older
/// releases.
pub struct GmsaasClient<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> GmsaasClient<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl GmsaasClient<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner)
    }
}

impl<R: CommandRunner> InstanceControl for GmsaasClient<R> {
    async fn start_instance(&self, recipe_uuid: &str, name: &str) -> Result<String, ProcessError> {
        invoke(
            &self.runner,
            GMSAAS,
            &["--format", "json", "instances", "start", recipe_uuid, name],
        )
        .await
    }

    async fn adb_connect(&self, uuid: &str, port: Option<u16>) -> Result<String, ProcessError> {
        let port = port.map(|p| p.to_string());
        let mut args = vec!["--format", "json", "instances", "adbconnect", uuid];
        if let Some(port) = port.as_deref() {
            args.push("--adb-serial-port");
            args.push(port);
        }
        invoke(&self.runner, GMSAAS, &args).await
    }

    async fn list_instances(&self) -> Result<String, ProcessError> {
        invoke(&self.runner, GMSAAS, &["--format", "json", "instances", "list"]).await
    }
}

impl<R: CommandRunner> ClientSetup for GmsaasClient<R> {
    async fn configure_sdk_path(&self, path: &str) -> Result<(), ProcessError> {
        invoke(
            &self.runner,
            GMSAAS,
            &["config", "set", "android-sdk-path", path],
        )
        .await
        .map(drop)
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ProcessError> {
        let result = match credentials {
            Credentials::Token(token) => {
                let token = token.as_str();
                invoke_masked(&self.runner, GMSAAS, &["auth", "token", token], &[token]).await
            }
            Credentials::Login { email, password } => {
                let password = password.as_str();
                invoke_masked(
                    &self.runner,
                    GMSAAS,
                    &["auth", "login", email.as_str(), password],
                    &[password],
                )
                .await
            }
        };
        result.map(drop)
    }
}
