use std::collections::HashMap;
use std::path::{Path, PathBuf};

use scantrack_model::Visit;
use scantrack_scanner::{compile_glob, dir_has_match, SubjectScanner};

use crate::Result;

const VOLUME_PATTERN: &str = "*_boldref.nii.gz";
const SURFACE_PATTERN: &str = "*k_bold.dtseries.nii*";

/// Functional flags contributed by an externally-run pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupplementalFlags {
    pub volume: bool,
    pub surface: bool,
}

/// An alternate derivatives tree maintained outside the main pipeline output,
/// OR-merged into the functional processing flags for the one visit it covers.
pub struct SupplementalSource {
    root: PathBuf,
    visit_key: String,
}

impl SupplementalSource {
    pub fn new(root: impl AsRef<Path>, visit_key: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            visit_key: visit_key.into(),
        }
    }

    pub fn applies_to(&self, visit: &Visit) -> bool {
        self.visit_key == visit.key()
    }

    /// Volume/surface flags per subject found under the supplemental tree.
    pub fn load(&self, visit: &Visit) -> Result<HashMap<String, SupplementalFlags>> {
        let mut flags = HashMap::new();
        let scanner = SubjectScanner::new(&self.root);
        if !scanner.exists() {
            log::warn!(
                "supplemental source {} does not exist; skipping",
                self.root.display()
            );
            return Ok(flags);
        }

        let volume = compile_glob(VOLUME_PATTERN)?;
        let surface = compile_glob(SURFACE_PATTERN)?;
        for subject in scanner.list()? {
            let func = self
                .root
                .join(&subject)
                .join(format!("ses-{}", visit.key()))
                .join("func");
            flags.insert(
                subject,
                SupplementalFlags {
                    volume: dir_has_match(&func, &volume),
                    surface: dir_has_match(&func, &surface),
                },
            );
        }
        log::info!(
            "supplemental source contributed flags for {} subjects",
            flags.len()
        );
        Ok(flags)
    }
}
