use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use scantrack_clinical::ExportSpec;
use scantrack_matrix::{DerivativePaths, ExtraModality};
use scantrack_model::{ClinicalFields, StudyLayout, Visit};
use serde::Deserialize;

/// The study config file (`scantrack.toml`).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    pub project: ProjectConfig,
    pub paths: PathsConfig,
    pub clinical: ClinicalConfig,
    #[serde(default)]
    pub supplemental: Option<SupplementalConfig>,
    #[serde(default)]
    pub overrides: OverridesConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,
    pub visits: Vec<VisitConfig>,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    /// Full-match pattern for enrolled numeric record ids (e.g. `1\d{3}`).
    pub id_pattern: String,
    #[serde(default)]
    pub extra_modalities: Vec<ExtraModalityConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitConfig {
    pub key: String,
    pub label: String,
    /// Survey column holding this visit's scan status code.
    pub status_field: String,
    /// Survey column holding this visit's reason-not-scanned code.
    pub reason_field: String,
    /// Directory under the data root; defaults to the key.
    #[serde(default)]
    pub dir: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraModalityConfig {
    pub name: String,
    pub dir: String,
    pub pattern: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    pub data_root: PathBuf,
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    #[serde(default = "default_bids_dir")]
    pub bids_dir: String,
    #[serde(default = "default_pipeline_dir")]
    pub pipeline_dir: String,
    #[serde(default = "default_dwi_dir")]
    pub dwi_dir: String,
    #[serde(default = "default_precomputed_dir")]
    pub precomputed_dir: String,
    #[serde(default = "default_reconall_dir")]
    pub reconall_dir: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClinicalConfig {
    pub export: PathBuf,
    pub dictionary: PathBuf,
    /// Record identifier column in the export (`study_id` or `record_id`).
    pub id_column: String,
    pub sex_primary: String,
    #[serde(default)]
    pub sex_secondary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupplementalConfig {
    pub path: PathBuf,
    pub visit: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverridesConfig {
    #[serde(default)]
    pub sex: BTreeMap<String, String>,
}

fn default_subject_prefix() -> String {
    "sub-".to_string()
}
fn default_csv_dir() -> PathBuf {
    PathBuf::from("./csv")
}
fn default_report_dir() -> PathBuf {
    PathBuf::from("./reports")
}
fn default_bids_dir() -> String {
    "bids".to_string()
}
fn default_pipeline_dir() -> String {
    "Nibabies".to_string()
}
fn default_dwi_dir() -> String {
    "Diffusion".to_string()
}
fn default_precomputed_dir() -> String {
    "precomputed".to_string()
}
fn default_reconall_dir() -> String {
    "recon-all".to_string()
}

impl StudyConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: StudyConfig =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.project.visits.is_empty() {
            bail!("config declares no visits");
        }
        if let Some(supplemental) = &self.supplemental {
            if self.visit(&supplemental.visit).is_err() {
                bail!(
                    "supplemental source names unknown visit {:?}",
                    supplemental.visit
                );
            }
        }
        Ok(())
    }

    pub fn visit(&self, key: &str) -> Result<&VisitConfig> {
        self.project
            .visits
            .iter()
            .find(|visit| visit.key == key)
            .with_context(|| {
                let known: Vec<&str> = self.project.visits.iter().map(|v| v.key.as_str()).collect();
                format!("unknown visit {key:?} (configured: {known:?})")
            })
    }

    pub fn layout(&self) -> Result<StudyLayout> {
        let visits = self
            .project
            .visits
            .iter()
            .map(VisitConfig::to_visit)
            .collect();
        let extras = self
            .project
            .extra_modalities
            .iter()
            .map(|extra| extra.name.clone())
            .collect();
        let mut clinical = HashMap::new();
        for visit in &self.project.visits {
            clinical.insert(
                visit.key.clone(),
                ClinicalFields {
                    status: visit.status_field.clone(),
                    reason: visit.reason_field.clone(),
                },
            );
        }
        Ok(StudyLayout::new(visits, extras, clinical)?)
    }

    pub fn extra_modalities(&self) -> Vec<ExtraModality> {
        self.project
            .extra_modalities
            .iter()
            .map(|extra| ExtraModality {
                name: extra.name.clone(),
                dir: extra.dir.clone(),
                pattern: extra.pattern.clone(),
            })
            .collect()
    }

    pub fn export_spec(&self) -> ExportSpec {
        ExportSpec {
            id_column: self.clinical.id_column.clone(),
            id_pattern: self.project.id_pattern.clone(),
            subject_prefix: self.project.subject_prefix.clone(),
            status_fields: self
                .project
                .visits
                .iter()
                .map(|visit| visit.status_field.clone())
                .collect(),
            reason_fields: self
                .project
                .visits
                .iter()
                .map(|visit| visit.reason_field.clone())
                .collect(),
            sex_primary: self.clinical.sex_primary.clone(),
            sex_secondary: self.clinical.sex_secondary.clone(),
            sex_overrides: self.overrides.sex.clone(),
        }
    }

    fn visit_root(&self, visit: &VisitConfig) -> PathBuf {
        let dir = visit.dir.as_deref().unwrap_or(&visit.key);
        self.paths.data_root.join(dir)
    }

    pub fn bids_path(&self, visit: &VisitConfig) -> PathBuf {
        self.visit_root(visit).join(&self.paths.bids_dir)
    }

    pub fn derivative_paths(&self, visit: &VisitConfig) -> DerivativePaths {
        let derivatives = self.visit_root(visit).join("derivatives");
        DerivativePaths {
            pipeline: derivatives.join(&self.paths.pipeline_dir),
            dwi: derivatives.join(&self.paths.dwi_dir),
            precomputed: derivatives.join(&self.paths.precomputed_dir),
            recon_all: derivatives.join(&self.paths.reconall_dir),
        }
    }

    pub fn acquisition_csv(&self, visit: &VisitConfig) -> PathBuf {
        self.paths
            .csv_dir
            .join(format!("{}_{}_acquisition.csv", self.project.name, visit.key))
    }

    pub fn derivatives_csv(&self, visit: &VisitConfig) -> PathBuf {
        self.paths
            .csv_dir
            .join(format!("{}_{}_derivatives.csv", self.project.name, visit.key))
    }

    pub fn report_csv(&self) -> PathBuf {
        self.paths
            .report_dir
            .join(format!("{}_final.csv", self.project.name))
    }
}

impl VisitConfig {
    pub fn to_visit(&self) -> Visit {
        Visit::new(self.key.clone(), self.label.clone())
    }
}
