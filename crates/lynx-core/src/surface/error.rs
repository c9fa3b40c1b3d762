use crate::morphology::MorphologyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Invalid stoichiometry: {0}")]
    InvalidStoichiometry(String),
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
    #[error("Invalid generation parameter: {0}")]
    InvalidParameter(String),
    #[error(
        "Unit-cell template has {found} particles, but inter-cell bonds need at least {required}"
    )]
    TemplateTooSmall { required: usize, found: usize },
    #[error("Template section <{section}> has {found} rows, expected {expected}")]
    TemplateMismatch {
        section: &'static str,
        found: usize,
        expected: usize,
    },
    #[error(transparent)]
    Morphology(#[from] MorphologyError),
}
