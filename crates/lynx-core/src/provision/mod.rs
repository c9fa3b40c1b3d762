//! # Provision Module
//!
//! The CI provisioning sequence: an optional conda environment rebuild keyed
//! on the branch under test, a package reinstall, and a coverage test run.

pub mod error;
pub mod plan;
pub mod runner;

pub use error::ProvisionError;
pub use plan::{Phase, ProvisionPlan, ProvisionSettings, Step};
pub use runner::{CommandRunner, SystemRunner};
