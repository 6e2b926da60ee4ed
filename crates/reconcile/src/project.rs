use scantrack_model::{
    Cell, ColumnId, Stage, Status, StudyLayout, WideTable, BIOLOGICAL_SEX, REASON_COL, STATUS_COL,
};

/// Rewrite the classified table into the canonical report shape.
///
/// Each visit keeps only its own status/reason columns (renamed to `Status`
/// and `Reason Not-Acquired`), the biological-sex column is deduplicated down
/// to the first visit's copy and moved to the front, and blank sex values
/// become `Missing`.
pub fn project_canonical(table: &WideTable, layout: &StudyLayout) -> WideTable {
    let first_label = layout.first_visit().label();
    let sex_src = ColumnId::acquired(first_label, BIOLOGICAL_SEX);

    // (source, destination) column plan, in report order.
    let mut plan: Vec<(ColumnId, ColumnId)> = Vec::new();
    if table.has_column(&sex_src) {
        plan.push((sex_src.clone(), sex_src.clone()));
    }
    for visit in layout.visits() {
        for modality in layout.modalities() {
            let col = ColumnId::acquired(visit.label(), modality.clone());
            if table.has_column(&col) {
                plan.push((col.clone(), col));
            }
        }
        let fields = layout.clinical_fields(visit);
        // A table that already went through projection carries the canonical
        // names; pass them through so reprojection is a no-op.
        let status_dst = ColumnId::acquired(visit.label(), STATUS_COL);
        let status_src = ColumnId::acquired(visit.label(), fields.status.clone());
        if table.has_column(&status_src) {
            plan.push((status_src, status_dst));
        } else if table.has_column(&status_dst) {
            plan.push((status_dst.clone(), status_dst));
        }
        let reason_dst = ColumnId::acquired(visit.label(), REASON_COL);
        let reason_src = ColumnId::acquired(visit.label(), fields.reason.clone());
        if table.has_column(&reason_src) {
            plan.push((reason_src, reason_dst));
        } else if table.has_column(&reason_dst) {
            plan.push((reason_dst.clone(), reason_dst));
        }
    }
    for visit in layout.visits() {
        for col in table.columns() {
            if col.stage == Stage::Processed && col.visit == visit.label() {
                plan.push((col.clone(), col.clone()));
            }
        }
    }

    let mut out = WideTable::new();
    for (_, dst) in &plan {
        out.ensure_column(dst);
    }
    for subject in table.subjects() {
        out.ensure_subject(subject);
        for (src, dst) in &plan {
            let mut cell = table.get(subject, src).cloned().unwrap_or(Cell::Unset);
            if dst.field == BIOLOGICAL_SEX && cell.is_blank() {
                cell = Cell::Status(Status::Missing);
            }
            out.set(subject, dst, cell);
        }
    }
    out
}
