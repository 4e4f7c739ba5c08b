//! CLI argument parsing with clap derive
//!
//! Every input doubles as an environment variable so the binary can run as a
//! pipeline step with no flags at all.

use anyhow::Result;
use clap::Parser;

use crate::application::services::provision::provision;
use crate::application::services::publish::{
    INSTANCE_ADB_SERIAL_KEY, INSTANCE_UUID_KEY, export_outputs,
};
use crate::application::services::setup::{SetupOptions, prepare_client};
use crate::domain::{Credentials, ProvisionError, StepConfig, StepInputs};
use crate::infra::envman::EnvmanExporter;
use crate::infra::gmsaas::GmsaasClient;
use crate::infra::installer::PipInstaller;
use crate::output::{OutputContext, TerminalReporter, json};

/// Start Genymotion SaaS Android instances and export their UUIDs and ADB serials
#[derive(Parser)]
#[command(name = "gmsaas-step", version)]
pub struct Cli {
    /// Genymotion SaaS API token (alternative to email/password)
    #[arg(long, env = "api_token", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Genymotion SaaS account email
    #[arg(long, env = "email")]
    pub email: Option<String>,

    /// Genymotion SaaS account password
    #[arg(long, env = "password", hide_env_values = true)]
    pub password: Option<String>,

    /// Comma-separated recipe UUIDs, one instance per entry
    #[arg(long, env = "recipe_uuid")]
    pub recipe_uuid: Option<String>,

    /// Comma-separated local ADB ports, one per recipe (empty: auto-assign)
    #[arg(long, env = "adb_serial_port")]
    pub adb_serial_port: Option<String>,

    /// gmsaas release to install when it is missing (default: latest)
    #[arg(long, env = "gmsaas_version")]
    pub gmsaas_version: Option<String>,

    /// Run-scoped build identifier used in instance names
    #[arg(long, env = "BITRISE_BUILD_NUMBER")]
    pub run_id: Option<String>,

    /// Android SDK location written into the gmsaas configuration
    #[arg(long, env = "ANDROID_HOME")]
    pub android_sdk_path: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    fn inputs(&self) -> StepInputs<'_> {
        StepInputs {
            api_token: self.api_token.as_deref(),
            email: self.email.as_deref(),
            password: self.password.as_deref(),
            recipe_uuid: self.recipe_uuid.as_deref(),
            adb_serial_port: self.adb_serial_port.as_deref(),
            gmsaas_version: self.gmsaas_version.as_deref(),
            run_id: self.run_id.as_deref(),
            android_sdk_path: self.android_sdk_path.as_deref(),
        }
    }

    /// Validate inputs, prepare gmsaas, start every instance, and export the
    /// results.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid input, a failed setup or export step, or
    /// when any instance failed. In the last case the results have already
    /// been exported.
    pub async fn run(self) -> Result<()> {
        let ctx = OutputContext::new(self.no_color, self.quiet || self.json);
        let config = StepConfig::from_inputs(&self.inputs())?;
        print_config(&ctx, &config);

        let reporter = TerminalReporter::new(&ctx);
        let installer = PipInstaller::default_runner();
        let client = GmsaasClient::default_runner();
        let exporter = EnvmanExporter::default_runner();

        prepare_client(
            &installer,
            &client,
            &exporter,
            &reporter,
            SetupOptions {
                credentials: &config.credentials,
                gmsaas_version: config.gmsaas_version.as_ref(),
                android_sdk_path: config.android_sdk_path.as_deref(),
            },
        )
        .await?;

        let result = provision(&client, &reporter, &config.fleet).await?;

        export_outputs(&exporter, &result).await?;
        ctx.success(&format!("exported {INSTANCE_UUID_KEY} and {INSTANCE_ADB_SERIAL_KEY}"));

        if self.json {
            println!("{}", json::format_result(&result)?);
        } else {
            ctx.instances(&result);
        }

        if result.any_failed() {
            return Err(ProvisionError::PartialFailure {
                failed: result.failed_count(),
                total: result.len(),
            }
            .into());
        }
        Ok(())
    }
}

/// Print validated inputs with secrets masked.
fn print_config(ctx: &OutputContext, config: &StepConfig) {
    ctx.header("Configuration");
    match &config.credentials {
        Credentials::Token(_) => ctx.kv("api_token", "***"),
        Credentials::Login { email, .. } => {
            ctx.kv("email", email);
            ctx.kv("password", "***");
        }
    }
    ctx.kv("recipe_uuid", &config.fleet.template_ids.join(","));
    let ports = config
        .fleet
        .ports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    ctx.kv("adb_serial_port", if ports.is_empty() { "(auto)" } else { &ports });
    let version = config
        .gmsaas_version
        .as_ref()
        .map_or_else(|| "latest".to_owned(), ToString::to_string);
    ctx.kv("gmsaas_version", &version);
    ctx.kv("run_id", &config.fleet.run_id);
}
