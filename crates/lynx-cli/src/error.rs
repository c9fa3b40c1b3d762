use lynx::forcefield::ForceFieldError;
use lynx::morphology::MorphologyError;
use lynx::provision::ProvisionError;
use lynx::surface::SurfaceError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    ForceField(#[from] ForceFieldError),

    #[error(transparent)]
    Morphology(#[from] MorphologyError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Validation failed with {errors} error(s) and {warnings} warning(s)")]
    Validation { errors: usize, warnings: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Provision(e) => e.exit_code(),
            _ => 1,
        }
    }
}
