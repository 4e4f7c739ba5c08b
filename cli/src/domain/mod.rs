//! Domain layer: pure types, parsing, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod instance;

pub use config::{Credentials, FleetSpec, StepConfig, StepInputs};
pub use error::{ConfigError, ExportError, ProcessError, ProvisionError, SetupError, TaskError};
pub use instance::{
    AggregatedResult, InstanceRecord, ProvisioningRequest, ResolvedInstance, TaskOutcome,
};
