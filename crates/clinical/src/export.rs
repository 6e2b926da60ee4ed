use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use regex::Regex;
use scantrack_model::{Cell, Frame, BIOLOGICAL_SEX};

use crate::{CodeDictionary, ClinicalError, Result};

/// Which export columns matter and how subject ids are normalized.
#[derive(Debug, Clone)]
pub struct ExportSpec {
    /// Record identifier column (`study_id` or `record_id` depending on the
    /// project's survey setup).
    pub id_column: String,
    /// Full-match pattern selecting enrolled numeric ids (e.g. `1\d{3}`).
    pub id_pattern: String,
    /// Prefix turning a numeric id into a subject folder name (`sub-`).
    pub subject_prefix: String,
    /// Per-visit status columns, in visit order.
    pub status_fields: Vec<String>,
    /// Per-visit reason-not-scanned columns, in visit order.
    pub reason_fields: Vec<String>,
    pub sex_primary: String,
    pub sex_secondary: Option<String>,
    pub sex_overrides: BTreeMap<String, String>,
}

/// Decodes the survey export into a clinical status frame keyed by
/// normalized subject id.
pub struct ClinicalSource {
    pub export: PathBuf,
    pub dictionary: PathBuf,
    pub spec: ExportSpec,
}

impl ClinicalSource {
    pub fn load(&self) -> Result<Frame> {
        let dictionary = CodeDictionary::from_csv(&self.dictionary)?;
        let export = File::open(&self.export)?;
        load_from(export, &dictionary, &self.spec)
    }
}

/// Testable core of [`ClinicalSource::load`].
pub(crate) fn load_from<R: Read>(
    reader: R,
    dictionary: &CodeDictionary,
    spec: &ExportSpec,
) -> Result<Frame> {
    let id_pattern = Regex::new(&format!("^{}$", spec.id_pattern))?;

    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    let id_idx = column_index(&headers, &spec.id_column)?;
    let mut coded_fields = Vec::new();
    for field in spec.status_fields.iter().chain(&spec.reason_fields) {
        coded_fields.push((field.clone(), column_index(&headers, field)?));
    }
    let sex_primary_idx = column_index(&headers, &spec.sex_primary)?;
    let sex_secondary_idx = match &spec.sex_secondary {
        Some(field) => Some(column_index(&headers, field)?),
        None => None,
    };

    let mut columns: Vec<String> = coded_fields.iter().map(|(name, _)| name.clone()).collect();
    columns.push(BIOLOGICAL_SEX.to_string());
    let mut frame = Frame::new(columns);

    let mut seen = HashSet::new();
    let mut dropped = 0usize;
    for record in csv.records() {
        let record = record?;
        let raw_id = record.get(id_idx).unwrap_or_default().trim();
        // The export repeats ids across event rows; the first wins.
        if raw_id.is_empty() || !seen.insert(raw_id.to_string()) {
            continue;
        }
        if !id_pattern.is_match(raw_id) {
            log::debug!("dropping non-study record id {raw_id:?}");
            continue;
        }
        let subject = format!("{}{raw_id}", spec.subject_prefix);

        // Non-enrolled rows carry no status in any visit.
        let enrolled = spec.status_fields.iter().any(|field| {
            let idx = coded_fields
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, idx)| *idx);
            idx.map_or(false, |idx| {
                !record.get(idx).unwrap_or_default().trim().is_empty()
            })
        });
        if !enrolled {
            dropped += 1;
            continue;
        }

        frame.push_subject(&subject);
        for (field, idx) in &coded_fields {
            let raw = record.get(*idx).unwrap_or_default().trim();
            if raw.is_empty() {
                continue;
            }
            let label = dictionary.decode(field, raw);
            frame.set(&subject, field, Cell::Text(label.to_string()))?;
        }

        let primary = record
            .get(sex_primary_idx)
            .map(|value| dictionary.decode(&spec.sex_primary, value.trim()));
        let secondary = sex_secondary_idx.and_then(|idx| record.get(idx)).map(|value| {
            let field = spec.sex_secondary.as_deref().unwrap_or_default();
            dictionary.decode(field, value.trim())
        });
        let sex = crate::resolve_sex(&subject, primary, secondary, &spec.sex_overrides)?;
        frame.set(&subject, BIOLOGICAL_SEX, Cell::Text(sex))?;
    }

    if dropped > 0 {
        log::debug!("dropped {dropped} non-enrolled survey records");
    }
    log::info!("clinical status loaded for {} subjects", frame.len());
    Ok(frame)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| ClinicalError::MissingColumn(name.to_string()))
}
