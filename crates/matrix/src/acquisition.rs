use std::path::{Path, PathBuf};

use globset::GlobMatcher;
use scantrack_model::{Cell, Frame, Visit, ANATOMICAL, DWI, FUNCTIONAL, T1W, T2W};
use scantrack_scanner::{compile_glob, dir_has_match, ModalityProbe, SubjectScanner};

use crate::Result;

/// A project-specific extra acquisition signal (e.g. `qMRI`), probed by glob
/// under a session subfolder.
#[derive(Debug, Clone)]
pub struct ExtraModality {
    pub name: String,
    pub dir: String,
    pub pattern: String,
}

struct CompiledExtra {
    name: String,
    dir: String,
    matcher: GlobMatcher,
}

/// Documents which subjects received scans: one boolean row per subject
/// folder under the visit's raw-data tree.
pub struct AcquisitionBuilder {
    bids: PathBuf,
    visit: Visit,
    probe: ModalityProbe,
    extras: Vec<CompiledExtra>,
}

impl AcquisitionBuilder {
    pub fn new(bids: impl AsRef<Path>, visit: Visit) -> Result<Self> {
        Self::with_extras(bids, visit, &[])
    }

    pub fn with_extras(
        bids: impl AsRef<Path>,
        visit: Visit,
        extras: &[ExtraModality],
    ) -> Result<Self> {
        let extras = extras
            .iter()
            .map(|extra| {
                Ok(CompiledExtra {
                    name: extra.name.clone(),
                    dir: extra.dir.clone(),
                    matcher: compile_glob(&extra.pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            bids: bids.as_ref().to_path_buf(),
            visit,
            probe: ModalityProbe::new()?,
            extras,
        })
    }

    pub fn build(&self) -> Result<Frame> {
        let scanner = SubjectScanner::new(&self.bids);
        let subjects = scanner.list()?;

        let mut columns: Vec<String> = [ANATOMICAL, T1W, T2W, FUNCTIONAL, DWI]
            .iter()
            .map(|c| c.to_string())
            .collect();
        columns.extend(self.extras.iter().map(|extra| extra.name.clone()));

        let mut frame = Frame::new(columns);
        for subject in &subjects {
            let session = self
                .bids
                .join(subject)
                .join(format!("ses-{}", self.visit.key()));

            frame.push_subject(subject);
            let anat = self.probe.anatomical(&session);
            frame.set(subject, T1W, Cell::Bool(anat.t1w))?;
            frame.set(subject, T2W, Cell::Bool(anat.t2w))?;
            frame.set(subject, ANATOMICAL, Cell::Bool(anat.any()))?;
            frame.set(subject, FUNCTIONAL, Cell::Bool(self.probe.functional(&session)))?;
            frame.set(subject, DWI, Cell::Bool(self.probe.diffusion(&session)))?;
            for extra in &self.extras {
                let present = dir_has_match(&session.join(&extra.dir), &extra.matcher);
                frame.set(subject, &extra.name, Cell::Bool(present))?;
            }
            log::debug!("documented acquisition for {subject} ({})", self.visit);
        }

        log::info!(
            "acquisition matrix for {} covers {} subjects",
            self.visit,
            frame.len()
        );
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn builds_boolean_rows_per_subject() {
        let temp = tempdir().unwrap();
        let bids = temp.path();
        touch(&bids.join("sub-1001/ses-newborn/anat/sub-1001_T1w.nii.gz"));
        touch(&bids.join("sub-1001/ses-newborn/func/sub-1001_bold.nii.gz"));
        fs::create_dir_all(bids.join("sub-1002/ses-newborn")).unwrap();

        let builder =
            AcquisitionBuilder::new(bids, Visit::new("newborn", "Newborn")).unwrap();
        let frame = builder.build().unwrap();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get("sub-1001", ANATOMICAL), Some(&Cell::Bool(true)));
        assert_eq!(frame.get("sub-1001", T1W), Some(&Cell::Bool(true)));
        assert_eq!(frame.get("sub-1001", T2W), Some(&Cell::Bool(false)));
        assert_eq!(frame.get("sub-1001", FUNCTIONAL), Some(&Cell::Bool(true)));
        assert_eq!(frame.get("sub-1001", DWI), Some(&Cell::Bool(false)));
        assert_eq!(frame.get("sub-1002", ANATOMICAL), Some(&Cell::Bool(false)));
    }

    #[test]
    fn anatomical_is_t1_or_t2() {
        let temp = tempdir().unwrap();
        let bids = temp.path();
        touch(&bids.join("sub-1001/ses-newborn/anat/sub-1001_T2w.nii.gz"));

        let builder =
            AcquisitionBuilder::new(bids, Visit::new("newborn", "Newborn")).unwrap();
        let frame = builder.build().unwrap();

        assert_eq!(frame.get("sub-1001", T1W), Some(&Cell::Bool(false)));
        assert_eq!(frame.get("sub-1001", T2W), Some(&Cell::Bool(true)));
        assert_eq!(frame.get("sub-1001", ANATOMICAL), Some(&Cell::Bool(true)));
    }

    #[test]
    fn extra_modalities_get_their_own_column() {
        let temp = tempdir().unwrap();
        let bids = temp.path();
        touch(&bids.join("sub-1001/ses-newborn/anat/sub-1001_qMRI.nii.gz"));

        let extras = [ExtraModality {
            name: "qMRI".into(),
            dir: "anat".into(),
            pattern: "*_qMRI.*".into(),
        }];
        let builder =
            AcquisitionBuilder::with_extras(bids, Visit::new("newborn", "Newborn"), &extras)
                .unwrap();
        let frame = builder.build().unwrap();

        assert!(frame.columns().contains(&"qMRI".to_string()));
        assert_eq!(frame.get("sub-1001", "qMRI"), Some(&Cell::Bool(true)));
    }
}
