use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::{Cell, ModelError, Result, STUDY_ID};

/// A flat, single-header table keyed by `study_id`.
///
/// The matrix builders and the clinical source each produce one of these per
/// visit; the reconciliation engine later stacks them into a [`crate::WideTable`].
/// Rows keep insertion order (the scanners emit subjects sorted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<FrameRow>,
    by_id: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq)]
struct FrameRow {
    study_id: String,
    cells: Vec<Cell>,
}

impl Frame {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, study_id: &str) -> bool {
        self.by_id.contains_key(study_id)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.study_id.as_str())
    }

    /// Add a subject row (all cells unset). Re-adding an existing subject is
    /// a no-op.
    pub fn push_subject(&mut self, study_id: &str) {
        if self.by_id.contains_key(study_id) {
            return;
        }
        self.by_id.insert(study_id.to_string(), self.rows.len());
        self.rows.push(FrameRow {
            study_id: study_id.to_string(),
            cells: vec![Cell::Unset; self.columns.len()],
        });
    }

    pub fn set(&mut self, study_id: &str, column: &str, cell: Cell) -> Result<()> {
        let col = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| ModelError::UnknownColumn(column.to_string()))?;
        let row = self
            .by_id
            .get(study_id)
            .copied()
            .ok_or_else(|| ModelError::UnknownSubject(study_id.to_string()))?;
        self.rows[row].cells[col] = cell;
        Ok(())
    }

    pub fn get(&self, study_id: &str, column: &str) -> Option<&Cell> {
        let col = self.columns.iter().position(|c| c == column)?;
        let row = self.by_id.get(study_id)?;
        Some(&self.rows[*row].cells[col])
    }

    /// Outer join another frame into this one on `study_id`.
    ///
    /// Columns missing here are appended; subjects missing on either side end
    /// up with unset cells in the other side's columns. Set cells from
    /// `other` win over anything already present.
    pub fn outer_merge(&mut self, other: &Frame) {
        for column in &other.columns {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.cells.push(Cell::Unset);
                }
            }
        }
        // Every column of `other` now has a slot here.
        let positions: Vec<usize> = other
            .columns
            .iter()
            .filter_map(|column| self.columns.iter().position(|c| c == column))
            .collect();
        for other_row in &other.rows {
            self.push_subject(&other_row.study_id);
            let row = self.by_id[&other_row.study_id];
            for (col, cell) in positions.iter().zip(&other_row.cells) {
                if !matches!(cell, Cell::Unset) {
                    self.rows[row].cells[*col] = cell.clone();
                }
            }
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let mut header = vec![STUDY_ID.to_string()];
        header.extend(self.columns.iter().cloned());
        csv.write_record(&header)?;
        for row in &self.rows {
            let mut record = vec![row.study_id.clone()];
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
        let mut csv = csv::Reader::from_reader(reader);
        let headers = csv.headers()?.clone();
        let mut fields = headers.iter();
        match fields.next() {
            Some(first) if first == STUDY_ID => {}
            other => {
                return Err(ModelError::MalformedHeader(format!(
                    "expected leading {STUDY_ID} column, found {other:?}"
                )))
            }
        }
        let mut frame = Frame::new(fields);
        for record in csv.records() {
            let record = record?;
            let mut values = record.iter();
            let study_id = values.next().unwrap_or_default().to_string();
            if study_id.is_empty() {
                continue;
            }
            frame.push_subject(&study_id);
            for (column, value) in frame.columns.clone().iter().zip(values) {
                frame.set(&study_id, column, Cell::from_raw(value))?;
            }
        }
        Ok(frame)
    }

    pub fn from_csv(path: &Path) -> Result<Self> {
        Self::read_csv(File::open(path)?)
    }
}
