use std::collections::HashMap;

use crate::{ModelError, Result, Visit};

pub const STUDY_ID: &str = "study_id";

// Acquisition signals.
pub const ANATOMICAL: &str = "Anatomical";
pub const T1W: &str = "T1w";
pub const T2W: &str = "T2w";
pub const FUNCTIONAL: &str = "Functional";
pub const DWI: &str = "DWI";

// Processing fields.
pub const SURFACE_RECON_METHOD: &str = "Surface-Recon-Method";
pub const DATE_PROCESSED: &str = "Date-Processed";
pub const FUNCTIONAL_VOLUME: &str = "Functional-Volume";
pub const FUNCTIONAL_SURFACE: &str = "Functional-Surface";
pub const PRECOMPUTED: &str = "Precomputed";
pub const RECON_ALL: &str = "Recon-all";

// Canonical clinical columns in the final report.
pub const STATUS_COL: &str = "Status";
pub const REASON_COL: &str = "Reason Not-Acquired";
pub const BIOLOGICAL_SEX: &str = "Biological Sex";

/// Processing fields dragged to `N/A` when the parent signal is not acquired.
pub fn dependents(modality: &str) -> &'static [&'static str] {
    match modality {
        ANATOMICAL => &[
            ANATOMICAL,
            SURFACE_RECON_METHOD,
            DATE_PROCESSED,
            PRECOMPUTED,
            RECON_ALL,
        ],
        FUNCTIONAL => &[FUNCTIONAL_VOLUME, FUNCTIONAL_SURFACE],
        DWI => &[DWI],
        _ => &[],
    }
}

/// Processing fields classified from their own raw flag once the parent is
/// acquired.
pub fn flag_fields(modality: &str) -> &'static [&'static str] {
    match modality {
        ANATOMICAL => &[ANATOMICAL, PRECOMPUTED, RECON_ALL],
        FUNCTIONAL => &[FUNCTIONAL_VOLUME, FUNCTIONAL_SURFACE],
        DWI => &[DWI],
        _ => &[],
    }
}

/// Passthrough fields that follow the parent's direct processing flag instead
/// of carrying a flag of their own.
pub fn shadow_fields(modality: &str) -> &'static [&'static str] {
    match modality {
        ANATOMICAL => &[SURFACE_RECON_METHOD, DATE_PROCESSED],
        _ => &[],
    }
}

/// Survey export column names backing one visit's clinical status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalFields {
    pub status: String,
    pub reason: String,
}

/// Everything the reconciliation engine needs to know about a study's shape:
/// which visits exist, which signals each visit carries, which processing
/// fields the derivative tables may contain, and which raw survey columns
/// hold each visit's clinical status.
#[derive(Debug, Clone)]
pub struct StudyLayout {
    visits: Vec<Visit>,
    modalities: Vec<String>,
    processing_fields: Vec<String>,
    clinical: HashMap<String, ClinicalFields>,
}

impl StudyLayout {
    /// Build a layout over the standard signal and field sets, with optional
    /// project-specific extra signals appended.
    pub fn new(
        visits: Vec<Visit>,
        extra_modalities: Vec<String>,
        clinical: HashMap<String, ClinicalFields>,
    ) -> Result<Self> {
        if visits.is_empty() {
            return Err(ModelError::InvalidLayout("no visits configured".into()));
        }
        for visit in &visits {
            if !clinical.contains_key(visit.key()) {
                return Err(ModelError::InvalidLayout(format!(
                    "no clinical fields configured for visit {}",
                    visit.key()
                )));
            }
        }

        let mut modalities: Vec<String> = [ANATOMICAL, T1W, T2W, FUNCTIONAL, DWI]
            .iter()
            .map(|m| m.to_string())
            .collect();
        for extra in extra_modalities {
            if !modalities.contains(&extra) {
                modalities.push(extra);
            }
        }

        let processing_fields = [
            ANATOMICAL,
            SURFACE_RECON_METHOD,
            DATE_PROCESSED,
            FUNCTIONAL_VOLUME,
            FUNCTIONAL_SURFACE,
            DWI,
            PRECOMPUTED,
            RECON_ALL,
        ]
        .iter()
        .map(|f| f.to_string())
        .collect();

        Ok(Self {
            visits,
            modalities,
            processing_fields,
            clinical,
        })
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn first_visit(&self) -> &Visit {
        &self.visits[0]
    }

    pub fn modalities(&self) -> &[String] {
        &self.modalities
    }

    pub fn processing_fields(&self) -> &[String] {
        &self.processing_fields
    }

    pub fn is_processing_field(&self, field: &str) -> bool {
        self.processing_fields.iter().any(|f| f == field)
    }

    pub fn clinical_fields(&self, visit: &Visit) -> &ClinicalFields {
        &self.clinical[visit.key()]
    }

    /// Raw clinical column names across every visit, in visit order.
    pub fn all_clinical_fields(&self) -> Vec<&ClinicalFields> {
        self.visits
            .iter()
            .map(|visit| &self.clinical[visit.key()])
            .collect()
    }
}
