use super::validate::ValidationReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForceFieldError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("XML syntax error near byte {position}: {source}")]
    Xml {
        position: u64,
        source: quick_xml::Error,
    },
    #[error("Expected root element <ForceField>, found <{0}>")]
    UnexpectedRoot(String),
    #[error("Document does not contain a <ForceField> element")]
    MissingRoot,
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: String,
    },
    #[error("Invalid number for attribute '{attribute}' on <{element}> (value: '{value}')")]
    InvalidNumber {
        element: &'static str,
        attribute: String,
        value: String,
    },
    #[error(
        "Repeated <NonbondedForce> declares different 1-4 scales \
         (coulomb {first_coulomb} vs {coulomb}, lj {first_lj} vs {lj})"
    )]
    ConflictingNonbondedScales {
        first_coulomb: f64,
        first_lj: f64,
        coulomb: f64,
        lj: f64,
    },
    #[error("Write error: {0}")]
    Write(#[from] std::io::Error),
    #[error("Force field failed validation with {} error(s)", .0.error_count())]
    Invalid(ValidationReport),
}
