//! # Scantrack Matrix
//!
//! Builds the boolean presence matrices the reconciliation engine consumes:
//! one acquisition frame per visit (was the scan taken) and one derivative
//! frame per visit (did the pipelines produce output).

mod acquisition;
mod derivative;
mod error;
mod runlog;
mod supplemental;

pub use acquisition::{AcquisitionBuilder, ExtraModality};
pub use derivative::{DerivativeBuilder, DerivativePaths};
pub use error::{MatrixError, Result};
pub use runlog::{extract_run_date, newest_run, read_recon_method};
pub use supplemental::{SupplementalFlags, SupplementalSource};
