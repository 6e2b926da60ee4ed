use std::collections::BTreeMap;

use scantrack_model::{
    dependents, flag_fields, shadow_fields, Cell, ColumnId, Status, StudyLayout, Visit, WideTable,
};

use crate::audit::{audit_table, AuditReport};
use crate::project::project_canonical;

/// Result of one reconciliation pass.
pub struct Reconciled {
    pub table: WideTable,
    pub audit: AuditReport,
}

/// The one-shot case a visit row falls into, decided from a single
/// evaluation of its modality signal vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitCase {
    /// Every signal is blank: nothing was acquired.
    AllMissing,
    /// Mixed raw signals: classify each modality independently.
    Partial,
    /// Every signal is a raw `true`: the visit completed in full.
    AllPresent,
    /// Every signal already carries a label; nothing left to do.
    Settled,
}

impl VisitCase {
    pub fn from_signals(signals: &[Cell]) -> VisitCase {
        if signals.iter().all(Cell::is_blank) {
            return VisitCase::AllMissing;
        }
        if signals.iter().all(Cell::is_true) {
            return VisitCase::AllPresent;
        }
        if signals
            .iter()
            .any(|cell| matches!(cell, Cell::Unset | Cell::Bool(_)))
        {
            return VisitCase::Partial;
        }
        VisitCase::Settled
    }
}

/// Derive the canonical categorical table from the merged snapshot.
///
/// Pure: the snapshot is cloned, classified visit by visit, projected into
/// the report column order, and audited. Feeding the output back in yields
/// the same table again.
pub fn reconcile(snapshot: &WideTable, layout: &StudyLayout) -> Reconciled {
    let mut table = snapshot.clone();
    let mut missing_records: BTreeMap<String, usize> = BTreeMap::new();

    let subjects: Vec<String> = table.subjects().map(str::to_string).collect();
    for subject in &subjects {
        for visit in layout.visits() {
            classify_visit(&mut table, subject, visit, layout, &mut missing_records);
        }
    }

    let table = project_canonical(&table, layout);
    let audit = audit_table(&table, missing_records);
    Reconciled { table, audit }
}

fn classify_visit(
    table: &mut WideTable,
    subject: &str,
    visit: &Visit,
    layout: &StudyLayout,
    missing_records: &mut BTreeMap<String, usize>,
) {
    let signal_cols: Vec<ColumnId> = layout
        .modalities()
        .iter()
        .map(|modality| ColumnId::acquired(visit.label(), modality.clone()))
        .collect();
    let signals: Vec<Cell> = signal_cols
        .iter()
        .map(|col| table.get(subject, col).cloned().unwrap_or(Cell::Unset))
        .collect();

    match VisitCase::from_signals(&signals) {
        VisitCase::Settled => {}
        VisitCase::AllMissing => {
            promote_blank_clinical(table, subject, visit, layout);
            for col in &signal_cols {
                if table.get(subject, col).map_or(true, Cell::is_blank) {
                    table.set(subject, col, Cell::Status(Status::NotAcquired));
                }
            }
            // Nothing acquired means nothing to process, passthrough fields
            // included.
            for field in layout.processing_fields() {
                let col = ColumnId::processed(visit.label(), field.clone());
                table.set_existing(subject, &col, Cell::Status(Status::NotApplicable));
            }
        }
        VisitCase::Partial => {
            promote_blank_clinical(table, subject, visit, layout);
            for (modality, col) in layout.modalities().iter().zip(&signal_cols) {
                let cell = table.get(subject, col).cloned().unwrap_or(Cell::Unset);
                match cell {
                    Cell::Unset | Cell::Bool(false) => {
                        table.set(subject, col, Cell::Status(Status::NotAcquired));
                        mark_not_applicable(table, subject, visit, modality);
                    }
                    Cell::Status(Status::NotAcquired) | Cell::Status(Status::Unknown) => {
                        mark_not_applicable(table, subject, visit, modality);
                    }
                    Cell::Bool(true) => {
                        table.set(subject, col, Cell::Status(Status::Acquired));
                        classify_dependents(table, subject, visit, modality, layout, missing_records);
                    }
                    Cell::Status(Status::Acquired) => {
                        classify_dependents(table, subject, visit, modality, layout, missing_records);
                    }
                    _ => {}
                }
            }
        }
        VisitCase::AllPresent => {
            let fields = layout.clinical_fields(visit);
            table.set_existing(
                subject,
                &ColumnId::acquired(visit.label(), fields.status.clone()),
                Cell::Status(Status::Completed),
            );
            table.set_existing(
                subject,
                &ColumnId::acquired(visit.label(), fields.reason.clone()),
                Cell::Status(Status::NotApplicable),
            );
            for (modality, col) in layout.modalities().iter().zip(&signal_cols) {
                table.set(subject, col, Cell::Status(Status::Acquired));
                classify_dependents(table, subject, visit, modality, layout, missing_records);
            }
        }
    }
}

/// A blank status/reason code for this visit means the survey never explained
/// the gap; promote it to an explicit `Unknown`. Definitive codes (including
/// a contradictory `Completed` on an all-missing row) are never overwritten.
fn promote_blank_clinical(table: &mut WideTable, subject: &str, visit: &Visit, layout: &StudyLayout) {
    let fields = layout.clinical_fields(visit);
    for name in [&fields.status, &fields.reason] {
        let col = ColumnId::acquired(visit.label(), name.clone());
        if table.get(subject, &col).map_or(false, Cell::is_blank) {
            table.set_existing(subject, &col, Cell::Status(Status::Unknown));
        }
    }
}

fn mark_not_applicable(table: &mut WideTable, subject: &str, visit: &Visit, modality: &str) {
    for field in dependents(modality) {
        let col = ColumnId::processed(visit.label(), *field);
        table.set_existing(subject, &col, Cell::Status(Status::NotApplicable));
    }
}

/// Classify the processing fields under an acquired modality from their own
/// raw flags. Fields with no record column at all are left alone and counted
/// for the end-of-run report — "no record" and "not processed" are different
/// facts.
fn classify_dependents(
    table: &mut WideTable,
    subject: &str,
    visit: &Visit,
    modality: &str,
    layout: &StudyLayout,
    missing_records: &mut BTreeMap<String, usize>,
) {
    for field in flag_fields(modality) {
        let col = ColumnId::processed(visit.label(), *field);
        let Some(cell) = table.get(subject, &col).cloned() else {
            if layout.is_processing_field(field) {
                *missing_records.entry(col.label()).or_insert(0) += 1;
            }
            continue;
        };
        match cell {
            Cell::Unset | Cell::Bool(false) => {
                table.set(subject, &col, Cell::Status(Status::NotProcessed));
                if *field == modality {
                    // The passthrough fields only exist when the direct
                    // pipeline output does.
                    for shadow in shadow_fields(modality) {
                        table.set_existing(
                            subject,
                            &ColumnId::processed(visit.label(), *shadow),
                            Cell::Status(Status::NotProcessed),
                        );
                    }
                }
            }
            Cell::Bool(true) => {
                table.set(subject, &col, Cell::Status(Status::Processed));
            }
            _ => {}
        }
    }
}
