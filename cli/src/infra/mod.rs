//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all process-executing code: the tokio command
//! runner and the gmsaas, envman, and pip adapters built on it.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::output` are forbidden.

pub mod command_runner;
pub mod envman;
pub mod gmsaas;
pub mod installer;
