use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClinicalError>;

#[derive(Error, Debug)]
pub enum ClinicalError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("model error: {0}")]
    ModelError(#[from] scantrack_model::ModelError),

    #[error("export is missing column: {0}")]
    MissingColumn(String),

    #[error("invalid subject id pattern: {0}")]
    BadIdPattern(#[from] regex::Error),

    /// Two independently reported sex values disagree; the record cannot be
    /// trusted and the run halts.
    #[error("sex fields disagree for {subject}: {primary:?} vs {secondary:?}")]
    SexFieldMismatch {
        subject: String,
        primary: String,
        secondary: String,
    },
}
