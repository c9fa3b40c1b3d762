//! # Surface Module
//!
//! Builds M1 catalyst plates by tiling a unit-cell template, substituting
//! placeholder metal sites according to a stoichiometry, and pairing two
//! plates face to face inside a periodic box.
//!
//! - [`params`] - Stoichiometry, dimensions and output naming
//! - [`builder`] - Tiling and two-plate assembly

pub mod builder;
pub mod error;
pub mod params;

pub use builder::{Compound, PlateSystem, assemble_system, build_surface};
pub use error::SurfaceError;
pub use params::{Dimensions, GenerationParams, Stoichiometry, output_file_name};
