use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatrixError>;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("scan error: {0}")]
    ScanError(#[from] scantrack_scanner::ScanError),

    #[error("model error: {0}")]
    ModelError(#[from] scantrack_model::ModelError),

    /// A subject has pipeline output but no run log to classify it from.
    /// Continuing would record a wrong default, so the run halts.
    #[error("missing processing log for {subject}: {}", .path.display())]
    MissingProcessingLog { subject: String, path: PathBuf },

    #[error("unreadable processing log for {subject}: {reason}")]
    UnreadableProcessingLog { subject: String, reason: String },
}
