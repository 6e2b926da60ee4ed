//! # Scantrack Reconcile
//!
//! The status reconciliation engine. Takes the merged boolean snapshot and
//! derives the canonical categorical table, enforcing the dependency rules
//! between parent scans and their derived products.
//!
//! ```text
//! acquisition frames ┐
//! derivative frames  ├──> merge ──> snapshot ──> reconcile ──> canonical table
//! clinical frame     ┘                                    └──> audit report
//! ```
//!
//! `reconcile` is a pure function of the snapshot: the input table is never
//! mutated, and running the engine over its own output changes nothing.

mod audit;
mod engine;
mod merge;
mod project;

pub use audit::AuditReport;
pub use engine::{reconcile, Reconciled, VisitCase};
pub use merge::{merge_sources, VisitSources};
