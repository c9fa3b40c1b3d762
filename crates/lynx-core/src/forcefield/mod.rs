//! # Force Field Module
//!
//! Declarative force-field parameter tables in the Foyer/OpenMM XML layout:
//! atom types, harmonic bonds and angles, Ryckaert-Bellemans torsions and
//! non-bonded (charge / Lennard-Jones) parameters with 1-4 scaling factors.
//!
//! ## Key Components
//!
//! - [`model`] - Immutable record types and lookups
//! - [`xml`] - Reading and writing the XML table
//! - [`validate`] - Referential-integrity and numeric checks
//! - [`library`] - Resolving force-field names to files
//!
//! ## Usage
//!
//! ```ignore
//! use lynx::forcefield::ForceField;
//!
//! let ff = ForceField::load(Path::new("FF_opls_uff.xml"))?;
//! let report = ff.validate();
//! assert!(report.is_valid());
//! ```

pub mod elements;
pub mod error;
pub mod library;
pub mod model;
pub mod validate;
mod xml;

pub use error::ForceFieldError;
pub use library::resolve_forcefield_path;
pub use model::{
    AngleParameter, AtomSelector, AtomType, BondParameter, ForceField, NonbondedForce,
    NonbondedParameter, TorsionParameter,
};
pub use validate::{Issue, Severity, ValidationReport};
