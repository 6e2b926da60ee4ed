//! # Scantrack Model
//!
//! Shared data model for the status tables.
//!
//! ## Pipeline
//!
//! ```text
//! Presence scans + survey export
//!     │
//!     ├──> Frame (one per visit per source)
//!     │      └─> boolean / coded cells
//!     │
//!     └──> WideTable (Stage × Visit × Field)
//!            └─> reconciled categorical report
//! ```

mod cell;
mod error;
mod frame;
mod layout;
mod status;
mod table;
mod visit;

pub use cell::Cell;
pub use error::{ModelError, Result};
pub use frame::Frame;
pub use layout::{
    dependents, flag_fields, shadow_fields, ClinicalFields, StudyLayout, ANATOMICAL,
    BIOLOGICAL_SEX, DATE_PROCESSED, DWI, FUNCTIONAL, FUNCTIONAL_SURFACE, FUNCTIONAL_VOLUME,
    PRECOMPUTED, REASON_COL, RECON_ALL, STATUS_COL, STUDY_ID, SURFACE_RECON_METHOD, T1W, T2W,
};
pub use status::Status;
pub use table::{ColumnId, WideTable};
pub use visit::{Stage, Visit};
