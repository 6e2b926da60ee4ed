//! # Scantrack Clinical
//!
//! Decodes the clinical survey export into per-subject, per-visit status and
//! reason labels plus a resolved biological-sex field. The export is the only
//! source that can explain *why* a scan is missing, so its coded values are
//! mapped to labels here, before the reconciliation engine sees them.

mod dictionary;
mod error;
mod export;
mod sex;

pub use dictionary::CodeDictionary;
pub use error::{ClinicalError, Result};
pub use export::{ClinicalSource, ExportSpec};
pub use sex::resolve_sex;
