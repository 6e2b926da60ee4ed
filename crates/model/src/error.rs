use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    #[error("malformed table header: {0}")]
    MalformedHeader(String),

    #[error("invalid study layout: {0}")]
    InvalidLayout(String),
}
