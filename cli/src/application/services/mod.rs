//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra` or `crate::output`.

pub mod correlate;
pub mod launch;
pub mod provision;
pub mod publish;
pub mod setup;
