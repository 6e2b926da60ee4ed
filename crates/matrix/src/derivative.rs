use std::path::PathBuf;

use scantrack_model::{
    Cell, Frame, Visit, ANATOMICAL, DATE_PROCESSED, DWI, FUNCTIONAL_SURFACE, FUNCTIONAL_VOLUME,
    PRECOMPUTED, RECON_ALL, SURFACE_RECON_METHOD,
};
use scantrack_scanner::{compile_glob, dir_has_match, dir_is_nonempty, SubjectScanner};

use crate::runlog::{extract_run_date, newest_run, read_recon_method};
use crate::{MatrixError, Result, SupplementalSource};

const VOLUME_PATTERN: &str = "*_boldref.nii.gz";
const SURFACE_PATTERN: &str = "*k_bold.dtseries.nii*";

/// Output directories of the derivative pipelines for one visit.
#[derive(Debug, Clone)]
pub struct DerivativePaths {
    /// Main anatomical/functional pipeline output (per-subject session trees
    /// with a `log/` folder per run).
    pub pipeline: PathBuf,
    pub dwi: PathBuf,
    pub precomputed: PathBuf,
    pub recon_all: PathBuf,
}

/// Documents which subjects were processed by the derivative pipelines.
pub struct DerivativeBuilder {
    paths: DerivativePaths,
    visit: Visit,
    supplemental: Option<SupplementalSource>,
}

impl DerivativeBuilder {
    pub fn new(paths: DerivativePaths, visit: Visit) -> Self {
        Self {
            paths,
            visit,
            supplemental: None,
        }
    }

    /// Attach a supplemental source; it only contributes when it covers this
    /// builder's visit.
    pub fn with_supplemental(mut self, source: SupplementalSource) -> Self {
        if source.applies_to(&self.visit) {
            self.supplemental = Some(source);
        }
        self
    }

    pub fn build(&self) -> Result<Frame> {
        let mut frame = self.pipeline_frame()?;
        frame.outer_merge(&self.category_frame(&self.paths.dwi, DWI)?);
        frame.outer_merge(&self.category_frame(&self.paths.precomputed, PRECOMPUTED)?);
        frame.outer_merge(&self.category_frame(&self.paths.recon_all, RECON_ALL)?);
        log::info!(
            "derivative matrix for {} covers {} subjects",
            self.visit,
            frame.len()
        );
        Ok(frame)
    }

    /// Main pipeline outputs plus the per-run log fields.
    ///
    /// A subject folder without a readable run log is fatal: without the log
    /// there is no way to tell which surface reconstruction produced the
    /// outputs, and a silent default would poison the report.
    fn pipeline_frame(&self) -> Result<Frame> {
        let columns = [
            ANATOMICAL,
            SURFACE_RECON_METHOD,
            DATE_PROCESSED,
            FUNCTIONAL_VOLUME,
            FUNCTIONAL_SURFACE,
        ];
        let mut frame = Frame::new(columns);

        let scanner = SubjectScanner::new(&self.paths.pipeline);
        if !scanner.exists() {
            log::warn!(
                "no pipeline derivatives under {}; emitting empty frame",
                self.paths.pipeline.display()
            );
            return Ok(frame);
        }

        let supplemental = match &self.supplemental {
            Some(source) => source.load(&self.visit)?,
            None => Default::default(),
        };
        let volume_glob = compile_glob(VOLUME_PATTERN)?;
        let surface_glob = compile_glob(SURFACE_PATTERN)?;

        for subject in scanner.list()? {
            let session = self
                .paths
                .pipeline
                .join(&subject)
                .join(format!("ses-{}", self.visit.key()));

            let has_anat = dir_is_nonempty(&session.join("anat"));
            let func = session.join("func");
            let mut has_volume = dir_has_match(&func, &volume_glob);
            let mut has_surface = dir_has_match(&func, &surface_glob);
            if let Some(flags) = supplemental.get(&subject) {
                has_volume = has_volume || flags.volume;
                has_surface = has_surface || flags.surface;
            }

            let log_dir = session.join("log");
            let run = newest_run(&log_dir).ok_or_else(|| MatrixError::MissingProcessingLog {
                subject: subject.clone(),
                path: log_dir.clone(),
            })?;
            let method = read_recon_method(&run, &subject)?;
            let date = extract_run_date(&run, &subject)?;

            frame.push_subject(&subject);
            frame.set(&subject, ANATOMICAL, Cell::Bool(has_anat))?;
            frame.set(&subject, FUNCTIONAL_VOLUME, Cell::Bool(has_volume))?;
            frame.set(&subject, FUNCTIONAL_SURFACE, Cell::Bool(has_surface))?;
            frame.set(&subject, SURFACE_RECON_METHOD, Cell::Text(method))?;
            frame.set(
                &subject,
                DATE_PROCESSED,
                Cell::Text(date.format("%Y-%m-%d").to_string()),
            )?;
            log::debug!("documented pipeline output for {subject} ({})", self.visit);
        }
        Ok(frame)
    }

    /// One-column frame for a standalone derivative category: subject folder
    /// nonempty means processed. An absent category directory yields the
    /// empty frame (with its column) rather than an error.
    fn category_frame(&self, root: &std::path::Path, field: &str) -> Result<Frame> {
        let mut frame = Frame::new([field]);
        let scanner = SubjectScanner::new(root);
        if !scanner.exists() {
            log::warn!(
                "no {field} derivatives under {}; emitting empty frame",
                root.display()
            );
            return Ok(frame);
        }
        for subject in scanner.list()? {
            let present = dir_is_nonempty(&root.join(&subject));
            frame.push_subject(&subject);
            frame.set(&subject, field, Cell::Bool(present))?;
        }
        Ok(frame)
    }
}
