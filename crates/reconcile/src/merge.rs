use scantrack_model::{Frame, Stage, Visit, WideTable};

/// The per-visit source frames feeding one merge.
pub struct VisitSources {
    pub visit: Visit,
    pub acquisition: Frame,
    pub derivatives: Frame,
}

/// Outer-join the source frames into one wide snapshot.
///
/// The clinical frame is repeated under every visit's Acquired block — each
/// visit's classification reads its own status columns, and the projection
/// step drops the foreign copies afterwards. Every cell no source reported
/// becomes an explicit raw `false`, so the engine only ever sees booleans,
/// labels, or text.
pub fn merge_sources(sources: &[VisitSources], clinical: &Frame) -> WideTable {
    let mut table = WideTable::new();
    for source in sources {
        table.merge_frame(Stage::Acquired, source.visit.label(), &source.acquisition);
        table.merge_frame(Stage::Acquired, source.visit.label(), clinical);
    }
    for source in sources {
        table.merge_frame(Stage::Processed, source.visit.label(), &source.derivatives);
    }
    table.fill_blanks();
    table.sort_subjects();
    table
}
