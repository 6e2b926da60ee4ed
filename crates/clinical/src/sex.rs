use std::collections::BTreeMap;

use crate::{ClinicalError, Result};

/// Resolve biological sex through the ordered fallback chain:
/// primary field → secondary field → static override table → `Missing`.
///
/// When both survey fields carry a value they must agree; a disagreement is
/// a data-integrity failure that halts the run.
pub fn resolve_sex(
    subject: &str,
    primary: Option<&str>,
    secondary: Option<&str>,
    overrides: &BTreeMap<String, String>,
) -> Result<String> {
    let primary = non_empty(primary);
    let secondary = non_empty(secondary);
    match (primary, secondary) {
        (Some(a), Some(b)) if a != b => Err(ClinicalError::SexFieldMismatch {
            subject: subject.to_string(),
            primary: a.to_string(),
            secondary: b.to_string(),
        }),
        (Some(a), _) => Ok(a.to_string()),
        (None, Some(b)) => Ok(b.to_string()),
        (None, None) => Ok(overrides
            .get(subject)
            .cloned()
            .unwrap_or_else(|| "Missing".to_string())),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("na") || value.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(value)
}
