use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{ClinicalError, Result};

const FIELD_NAME_COL: &str = "Variable / Field Name";
const CHOICES_COL: &str = "Choices, Calculations, OR Slider Labels";

/// Code → label maps per survey field, parsed from the survey's data
/// dictionary export.
///
/// The dictionary encodes choices as `1, Completed | 2, No show | 99, Other`
/// in a single cell; fields without choices (free text) simply have none.
#[derive(Debug, Clone, Default)]
pub struct CodeDictionary {
    fields: HashMap<String, HashMap<String, String>>,
}

impl CodeDictionary {
    pub fn from_csv(path: &Path) -> Result<Self> {
        Self::read(File::open(path)?)
    }

    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::Reader::from_reader(reader);
        let headers = csv.headers()?.clone();
        let name_idx = position(&headers, FIELD_NAME_COL)?;
        let choices_idx = position(&headers, CHOICES_COL)?;

        let mut fields = HashMap::new();
        for record in csv.records() {
            let record = record?;
            let field = record.get(name_idx).unwrap_or_default().trim();
            let choices = record.get(choices_idx).unwrap_or_default();
            if field.is_empty() || choices.trim().is_empty() {
                continue;
            }
            fields.insert(field.to_string(), parse_choices(choices));
        }
        Ok(Self { fields })
    }

    /// Decode one value for one field; unknown fields and unknown codes pass
    /// through unchanged (the export sometimes already holds labels).
    pub fn decode<'a>(&'a self, field: &str, value: &'a str) -> &'a str {
        self.fields
            .get(field)
            .and_then(|codes| codes.get(value))
            .map(String::as_str)
            .unwrap_or(value)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

fn parse_choices(choices: &str) -> HashMap<String, String> {
    let mut codes = HashMap::new();
    for segment in choices.split('|') {
        if let Some((code, label)) = segment.split_once(", ") {
            codes.insert(code.trim().to_string(), label.trim().to_string());
        }
    }
    codes
}

fn position(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| ClinicalError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DICT: &str = "\
Variable / Field Name,Form Name,\"Choices, Calculations, OR Slider Labels\"
neonatal_status,scans,\"1, Completed | 2, Withdrawn | 99, Not contacted\"
neonatal_notscan,scans,\"1, Medical exclusion | 2, Family declined\"
free_text,scans,
";

    #[test]
    fn decodes_known_codes() {
        let dict = CodeDictionary::read(DICT.as_bytes()).unwrap();
        assert_eq!(dict.decode("neonatal_status", "1"), "Completed");
        assert_eq!(dict.decode("neonatal_status", "99"), "Not contacted");
        assert_eq!(dict.decode("neonatal_notscan", "2"), "Family declined");
    }

    #[test]
    fn unknown_codes_and_fields_pass_through() {
        let dict = CodeDictionary::read(DICT.as_bytes()).unwrap();
        assert_eq!(dict.decode("neonatal_status", "Completed"), "Completed");
        assert_eq!(dict.decode("unlisted_field", "7"), "7");
        assert!(!dict.has_field("free_text"));
    }

    #[test]
    fn missing_header_is_an_error() {
        let err = CodeDictionary::read("a,b\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ClinicalError::MissingColumn(_)));
    }
}
