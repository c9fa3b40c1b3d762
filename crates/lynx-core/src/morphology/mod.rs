//! # Morphology Module
//!
//! Reading, writing and repairing HOOMD-blue XML morphologies.
//!
//! - [`model`] - The in-memory snapshot with typed section accessors
//! - [`hoomd`] - XML reader and writer
//! - [`periodic`] - Wrapping into the periodic box and image repair across bonds

pub mod error;
mod hoomd;
pub mod model;
pub mod periodic;

pub use error::MorphologyError;
pub use model::{BondRecord, Morphology, Section};
pub use periodic::ImageFixSummary;
