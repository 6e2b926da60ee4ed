use std::path::Path;

use globset::GlobMatcher;

use crate::scanner::{compile_glob, dir_has_match};
use crate::Result;

const T1W_PATTERN: &str = "*_T1w.*";
const T2W_PATTERN: &str = "*_T2w.*";
const BOLD_PATTERN: &str = "*_bold.*";
const DWI_PATTERN: &str = "*_dwi.*";

/// Raw anatomical presence signals for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnatPresence {
    pub t1w: bool,
    pub t2w: bool,
}

impl AnatPresence {
    pub fn any(self) -> bool {
        self.t1w || self.t2w
    }
}

/// Modality file-pattern checks under a session folder
/// (`ses-<visit>/{anat,func,dwi}`).
pub struct ModalityProbe {
    t1w: GlobMatcher,
    t2w: GlobMatcher,
    bold: GlobMatcher,
    dwi: GlobMatcher,
}

impl ModalityProbe {
    pub fn new() -> Result<Self> {
        Ok(Self {
            t1w: compile_glob(T1W_PATTERN)?,
            t2w: compile_glob(T2W_PATTERN)?,
            bold: compile_glob(BOLD_PATTERN)?,
            dwi: compile_glob(DWI_PATTERN)?,
        })
    }

    /// T1w/T2w presence under `anat/`, falling back to `anat_raw/` when the
    /// curated folder has neither (scans awaiting curation still count as
    /// acquired).
    pub fn anatomical(&self, session_dir: &Path) -> AnatPresence {
        let anat = session_dir.join("anat");
        let mut presence = AnatPresence {
            t1w: dir_has_match(&anat, &self.t1w),
            t2w: dir_has_match(&anat, &self.t2w),
        };
        if !presence.t1w && !presence.t2w {
            let raw = session_dir.join("anat_raw");
            if raw.is_dir() {
                presence = AnatPresence {
                    t1w: dir_has_match(&raw, &self.t1w),
                    t2w: dir_has_match(&raw, &self.t2w),
                };
            }
        }
        presence
    }

    pub fn functional(&self, session_dir: &Path) -> bool {
        dir_has_match(&session_dir.join("func"), &self.bold)
    }

    pub fn diffusion(&self, session_dir: &Path) -> bool {
        dir_has_match(&session_dir.join("dwi"), &self.dwi)
    }
}
