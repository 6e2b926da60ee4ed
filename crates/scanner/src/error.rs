use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("missing scan root: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("invalid glob pattern: {0}")]
    PatternError(#[from] globset::Error),
}
