use thiserror::Error;

#[derive(Debug, Error)]
pub enum MorphologyError {
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
    #[error("Document has no configuration element")]
    MissingConfiguration,
    #[error("Missing required section <{0}>")]
    MissingSection(String),
    #[error("Missing required attribute '{attribute}' on <{section}>")]
    MissingAttribute { section: String, attribute: String },
    #[error("Invalid value in <{section}> row {row}: '{value}'")]
    InvalidValue {
        section: String,
        row: usize,
        value: String,
    },
    #[error("Row {row} of <{section}> has too few columns")]
    MalformedRow { section: String, row: usize },
    #[error("Bond in row {row} references atom {index}, but there are only {natoms} atoms")]
    BondOutOfRange {
        row: usize,
        index: usize,
        natoms: usize,
    },
    #[error("Box edge lengths must be positive and finite (got {0})")]
    InvalidBox(f64),
    #[error("Atom {0} has a non-finite coordinate")]
    NonFinitePosition(usize),
    #[error("Section <{section}> has {found} rows, expected {expected}")]
    LengthMismatch {
        section: String,
        found: usize,
        expected: usize,
    },
    #[error("Write error: {0}")]
    Write(#[from] std::io::Error),
}
