use std::collections::BTreeMap;

use scantrack_model::{Cell, WideTable};
use serde::Serialize;

/// End-of-run accounting of cells the engine could not classify.
///
/// Advisory, never blocking: the report still saves. Leftover booleans mean a
/// signal fell through every branch; missing records mean an acquired
/// modality had no processing column to classify at all.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    /// Column label → count of cells still unset.
    pub unset_cells: BTreeMap<String, usize>,
    /// Column label → count of cells still raw booleans.
    pub boolean_cells: BTreeMap<String, usize>,
    /// Column label → subjects whose record column was absent.
    pub missing_records: BTreeMap<String, usize>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.unset_cells.is_empty()
            && self.boolean_cells.is_empty()
            && self.missing_records.is_empty()
    }

    pub fn log_warnings(&self) {
        for (column, count) in &self.unset_cells {
            log::warn!("{count} unset cell(s) remain in {column}");
        }
        for (column, count) in &self.boolean_cells {
            log::warn!("{count} raw boolean cell(s) remain in {column}");
        }
        for (column, count) in &self.missing_records {
            log::warn!("{count} subject(s) had no processing record for {column}");
        }
        if self.is_clean() {
            log::info!("reconciled table is fully categorical");
        }
    }
}

pub(crate) fn audit_table(
    table: &WideTable,
    missing_records: BTreeMap<String, usize>,
) -> AuditReport {
    let mut report = AuditReport {
        missing_records,
        ..Default::default()
    };
    for subject in table.subjects() {
        for column in table.columns() {
            match table.get(subject, column) {
                Some(Cell::Unset) | None => {
                    *report.unset_cells.entry(column.label()).or_insert(0) += 1;
                }
                Some(Cell::Bool(_)) => {
                    *report.boolean_cells.entry(column.label()).or_insert(0) += 1;
                }
                Some(Cell::Status(_)) | Some(Cell::Text(_)) => {}
            }
        }
    }
    report
}
