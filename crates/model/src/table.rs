use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::{Cell, Frame, ModelError, Result, Stage, STUDY_ID};

/// Three-level column address in the wide table: Stage / Visit / Field.
///
/// The visit component is the display label (`Newborn`), matching what the
/// report header shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnId {
    pub stage: Stage,
    pub visit: String,
    pub field: String,
}

impl ColumnId {
    pub fn new(stage: Stage, visit: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            stage,
            visit: visit.into(),
            field: field.into(),
        }
    }

    pub fn acquired(visit: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(Stage::Acquired, visit, field)
    }

    pub fn processed(visit: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(Stage::Processed, visit, field)
    }

    /// `Acquired/Newborn/Status` — used in audit output and log lines.
    pub fn label(&self) -> String {
        format!("{}/{}/{}", self.stage.as_str(), self.visit, self.field)
    }
}

/// The merged subject × (stage, visit, field) table.
///
/// One row per subject; columns keep insertion order, which the projection
/// step later rewrites into the canonical report order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    columns: Vec<ColumnId>,
    col_index: HashMap<ColumnId, usize>,
    rows: Vec<WideRow>,
    by_id: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq)]
struct WideRow {
    subject: String,
    cells: Vec<Cell>,
}

impl WideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    pub fn has_column(&self, column: &ColumnId) -> bool {
        self.col_index.contains_key(column)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.subject.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ensure_column(&mut self, column: &ColumnId) -> usize {
        if let Some(&idx) = self.col_index.get(column) {
            return idx;
        }
        let idx = self.columns.len();
        self.columns.push(column.clone());
        self.col_index.insert(column.clone(), idx);
        for row in &mut self.rows {
            row.cells.push(Cell::Unset);
        }
        idx
    }

    pub fn ensure_subject(&mut self, subject: &str) -> usize {
        if let Some(&idx) = self.by_id.get(subject) {
            return idx;
        }
        let idx = self.rows.len();
        self.by_id.insert(subject.to_string(), idx);
        self.rows.push(WideRow {
            subject: subject.to_string(),
            cells: vec![Cell::Unset; self.columns.len()],
        });
        idx
    }

    pub fn set(&mut self, subject: &str, column: &ColumnId, cell: Cell) {
        let col = self.ensure_column(column);
        let row = self.ensure_subject(subject);
        self.rows[row].cells[col] = cell;
    }

    /// Set only when the column already exists; returns whether it did.
    pub fn set_existing(&mut self, subject: &str, column: &ColumnId, cell: Cell) -> bool {
        match self.col_index.get(column).copied() {
            Some(col) => {
                let row = self.ensure_subject(subject);
                self.rows[row].cells[col] = cell;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, subject: &str, column: &ColumnId) -> Option<&Cell> {
        let col = *self.col_index.get(column)?;
        let row = *self.by_id.get(subject)?;
        Some(&self.rows[row].cells[col])
    }

    /// Outer-merge a single-level frame under a (stage, visit) block.
    pub fn merge_frame(&mut self, stage: Stage, visit: &str, frame: &Frame) {
        for field in frame.columns() {
            self.ensure_column(&ColumnId::new(stage, visit, field.clone()));
        }
        for subject in frame.subjects().map(str::to_string).collect::<Vec<_>>() {
            self.ensure_subject(&subject);
            for field in frame.columns() {
                if let Some(cell) = frame.get(&subject, field) {
                    if !matches!(cell, Cell::Unset) {
                        let column = ColumnId::new(stage, visit, field.clone());
                        self.set(&subject, &column, cell.clone());
                    }
                }
            }
        }
    }

    /// Replace every unset cell with an explicit raw `false`, mirroring the
    /// blank-fill the sources apply before classification.
    pub fn fill_blanks(&mut self) {
        for row in &mut self.rows {
            for cell in &mut row.cells {
                if matches!(cell, Cell::Unset) {
                    *cell = Cell::Bool(false);
                }
            }
        }
    }

    pub fn sort_subjects(&mut self) {
        self.rows.sort_by(|a, b| a.subject.cmp(&b.subject));
        self.by_id = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.subject.clone(), idx))
            .collect();
    }

    /// Serialize with the three header rows (Stage, Visit, Field) followed by
    /// a `study_id` marker row, matching the report format downstream tools
    /// consume.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut stages = vec!["Stage".to_string()];
        let mut visits = vec!["Visit".to_string()];
        let mut fields = vec!["Field".to_string()];
        for column in &self.columns {
            stages.push(column.stage.as_str().to_string());
            visits.push(column.visit.clone());
            fields.push(column.field.clone());
        }
        csv.write_record(&stages)?;
        csv.write_record(&visits)?;
        csv.write_record(&fields)?;

        let mut marker = vec![STUDY_ID.to_string()];
        marker.extend(std::iter::repeat(String::new()).take(self.columns.len()));
        csv.write_record(&marker)?;

        for row in &self.rows {
            let mut record = vec![row.subject.clone()];
            record.extend(row.cells.iter().map(Cell::render));
            csv.write_record(&record)?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.write_csv(File::create(path)?)
    }

    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records = csv.records();

        let stages = Self::header_row(&mut records, "Stage")?;
        let visits = Self::header_row(&mut records, "Visit")?;
        let fields = Self::header_row(&mut records, "Field")?;
        if stages.len() != visits.len() || visits.len() != fields.len() {
            return Err(ModelError::MalformedHeader(
                "header rows have mismatched widths".into(),
            ));
        }

        let mut table = WideTable::new();
        for ((stage, visit), field) in stages.iter().zip(&visits).zip(&fields) {
            let stage = Stage::parse(stage).ok_or_else(|| {
                ModelError::MalformedHeader(format!("unknown stage token: {stage}"))
            })?;
            table.ensure_column(&ColumnId::new(stage, visit.clone(), field.clone()));
        }

        for record in records {
            let record = record?;
            let mut values = record.iter();
            let subject = values.next().unwrap_or_default().to_string();
            if subject.is_empty() || subject == STUDY_ID {
                continue;
            }
            table.ensure_subject(&subject);
            for (column, value) in table.columns.clone().iter().zip(values) {
                table.set(&subject, column, Cell::from_raw(value));
            }
        }
        Ok(table)
    }

    pub fn from_csv(path: &Path) -> Result<Self> {
        Self::read_csv(File::open(path)?)
    }

    fn header_row<R: Read>(
        records: &mut csv::StringRecordsIter<'_, R>,
        name: &str,
    ) -> Result<Vec<String>> {
        let record = records
            .next()
            .ok_or_else(|| ModelError::MalformedHeader(format!("missing {name} header row")))??;
        let mut values = record.iter();
        match values.next() {
            Some(first) if first == name => {}
            other => {
                return Err(ModelError::MalformedHeader(format!(
                    "expected {name} header row, found {other:?}"
                )))
            }
        }
        Ok(values.map(str::to_string).collect())
    }
}
