//! Step input validation.
//!
//! Pure functions only: no I/O, no async, no filesystem access. Everything
//! here runs before the first external command is issued.

use crate::domain::error::ConfigError;
use crate::domain::instance::{ProvisioningRequest, instance_name};

// ── Credentials ──────────────────────────────────────────────────────────────

/// How to authenticate against Genymotion SaaS. Exactly one form is allowed.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Login { email: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(***)"),
            Self::Login { email, .. } => write!(f, "Login {{ email: {email:?}, password: *** }}"),
        }
    }
}

/// Oldest gmsaas release accepted as a pin; every command is issued with
/// `--format json`, which earlier releases reject.
pub const MIN_GMSAAS_VERSION: semver::Version = semver::Version::new(1, 1, 0);

/// Treat unset and empty inputs the same way; pipelines export empty strings
/// for inputs the user left blank.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Like `non_empty`, but keeps the value untrimmed. Secrets are passed to
/// gmsaas verbatim.
fn supplied(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Credentials {
    /// Pick the single credential form supplied.
    ///
    /// # Errors
    ///
    /// Returns an error if no form, both forms, or half a login pair is given.
    pub fn resolve(
        api_token: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let token = supplied(api_token);
        let email = non_empty(email);
        let password = supplied(password);
        match (token, email, password) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                Err(ConfigError::ConflictingCredentials)
            }
            (Some(token), None, None) => Ok(Self::Token(token.to_owned())),
            (None, Some(email), Some(password)) => Ok(Self::Login {
                email: email.to_owned(),
                password: password.to_owned(),
            }),
            (None, Some(_), None) | (None, None, Some(_)) => Err(ConfigError::IncompleteLogin),
            (None, None, None) => Err(ConfigError::MissingCredentials),
        }
    }
}

// ── Fleet ────────────────────────────────────────────────────────────────────

/// The set of instances to start in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetSpec {
    pub template_ids: Vec<String>,
    /// Empty, or exactly one port per template id.
    pub ports: Vec<u16>,
    pub run_id: String,
}

impl FleetSpec {
    /// Parse the comma-separated recipe and port lists.
    ///
    /// # Errors
    ///
    /// Returns an error if no recipe is given, a recipe entry is empty, a port
    /// is not a valid non-zero `u16`, or the port count does not match.
    pub fn parse(recipes: &str, ports: &str, run_id: &str) -> Result<Self, ConfigError> {
        if recipes.trim().is_empty() {
            return Err(ConfigError::MissingTemplates);
        }
        let template_ids = recipes
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(position, id)| {
                if id.is_empty() {
                    Err(ConfigError::EmptyTemplateId { position })
                } else {
                    Ok(id.to_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ports = if ports.trim().is_empty() {
            Vec::new()
        } else {
            ports
                .split(',')
                .map(str::trim)
                .map(|p| match p.parse::<u16>() {
                    Ok(port) if port != 0 => Ok(port),
                    _ => Err(ConfigError::InvalidPort {
                        value: p.to_owned(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let spec = Self {
            template_ids,
            ports,
            run_id: run_id.trim().to_owned(),
        };
        spec.check_port_count()?;
        Ok(spec)
    }

    fn check_port_count(&self) -> Result<(), ConfigError> {
        if self.ports.is_empty() || self.ports.len() == self.template_ids.len() {
            Ok(())
        } else {
            Err(ConfigError::PortCountMismatch {
                ports: self.ports.len(),
                templates: self.template_ids.len(),
            })
        }
    }

    /// One request per template id, in input order, each with its generated
    /// name and optional port.
    ///
    /// # Errors
    ///
    /// Returns an error if the port list is non-empty and its length differs
    /// from the template count.
    pub fn plan_requests(&self) -> Result<Vec<ProvisioningRequest>, ConfigError> {
        self.check_port_count()?;
        Ok(self
            .template_ids
            .iter()
            .enumerate()
            .map(|(index, template_id)| ProvisioningRequest {
                index,
                template_id: template_id.clone(),
                requested_name: instance_name(&self.run_id, index),
                bridge_port: self.ports.get(index).copied(),
            })
            .collect())
    }
}

// ── Step configuration ───────────────────────────────────────────────────────

/// Raw step inputs as read from flags or the pipeline environment.
#[derive(Debug, Default)]
pub struct StepInputs<'a> {
    pub api_token: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub recipe_uuid: Option<&'a str>,
    pub adb_serial_port: Option<&'a str>,
    pub gmsaas_version: Option<&'a str>,
    pub run_id: Option<&'a str>,
    pub android_sdk_path: Option<&'a str>,
}

/// Validated step configuration.
#[derive(Debug, Clone)]
pub struct StepConfig {
    pub credentials: Credentials,
    pub fleet: FleetSpec,
    /// gmsaas release to install when the client is missing; latest if `None`.
    pub gmsaas_version: Option<semver::Version>,
    pub android_sdk_path: Option<String>,
}

impl StepConfig {
    /// Validate all inputs.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn from_inputs(inputs: &StepInputs<'_>) -> Result<Self, ConfigError> {
        let credentials = Credentials::resolve(inputs.api_token, inputs.email, inputs.password)?;
        let fleet = FleetSpec::parse(
            inputs.recipe_uuid.unwrap_or_default(),
            inputs.adb_serial_port.unwrap_or_default(),
            inputs.run_id.unwrap_or_default(),
        )?;
        let gmsaas_version = non_empty(inputs.gmsaas_version)
            .map(parse_version)
            .transpose()?;
        Ok(Self {
            credentials,
            fleet,
            gmsaas_version,
            android_sdk_path: non_empty(inputs.android_sdk_path).map(str::to_owned),
        })
    }
}

fn parse_version(value: &str) -> Result<semver::Version, ConfigError> {
    let version = semver::Version::parse(value).map_err(|e| ConfigError::InvalidVersion {
        value: value.to_owned(),
        reason: e.to_string(),
    })?;
    if version < MIN_GMSAAS_VERSION {
        return Err(ConfigError::UnsupportedVersion {
            value: value.to_owned(),
            minimum: MIN_GMSAAS_VERSION.to_string(),
        });
    }
    Ok(version)
}
