//! # Lynx Core Library
//!
//! Tooling around molecular-dynamics inputs for M1 catalyst / hydrocarbon
//! systems.
//!
//! - **[`forcefield`]:** Foyer/OpenMM XML force-field tables. Parsing into
//!   immutable records, integrity validation and faithful re-serialization.
//!
//! - **[`morphology`]:** HOOMD-blue XML snapshots, periodic wrapping and
//!   image repair across bonds.
//!
//! - **[`surface`]:** Tiling a unit-cell template into catalyst plates with
//!   stoichiometric site substitution, and assembling a two-plate system.
//!
//! - **[`provision`]:** The CI environment/provision/test sequence and its
//!   command runner.

pub mod forcefield;
pub mod morphology;
pub mod provision;
pub mod surface;
