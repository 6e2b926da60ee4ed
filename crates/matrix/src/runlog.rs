use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use crate::{MatrixError, Result};

const LOG_FILE_NAME: &str = "pipeline.toml";

#[derive(Debug, Deserialize)]
struct PipelineLog {
    workflow: Workflow,
}

#[derive(Debug, Deserialize)]
struct Workflow {
    surface_recon_method: String,
}

/// Newest run directory under a subject's `log/` folder.
///
/// Run folders embed their start date in the name, so descending name order
/// is descending recency.
pub fn newest_run(log_dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(log_dir).ok()?;
    let mut runs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    runs.sort();
    runs.pop()
}

/// Surface reconstruction method recorded in the run's TOML log
/// (`infantfs` or `mcribs`).
pub fn read_recon_method(run_dir: &Path, subject: &str) -> Result<String> {
    let log_file = run_dir.join(LOG_FILE_NAME);
    if !log_file.is_file() {
        return Err(MatrixError::MissingProcessingLog {
            subject: subject.to_string(),
            path: log_file,
        });
    }
    let text = std::fs::read_to_string(&log_file)?;
    let parsed: PipelineLog =
        toml::from_str(&text).map_err(|e| MatrixError::UnreadableProcessingLog {
            subject: subject.to_string(),
            reason: format!("{}: {e}", log_file.display()),
        })?;
    Ok(parsed.workflow.surface_recon_method)
}

/// Processing date embedded in the run directory name (`YYYYMMDD`).
pub fn extract_run_date(run_dir: &Path, subject: &str) -> Result<NaiveDate> {
    let name = run_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    // Run folder names look like 20240302-143055_<uuid>.
    let pattern = Regex::new(r"\d{8}").expect("static regex");
    let digits = pattern
        .find(name)
        .ok_or_else(|| MatrixError::UnreadableProcessingLog {
            subject: subject.to_string(),
            reason: format!("no date in run folder name {name:?}"),
        })?;
    NaiveDate::parse_from_str(digits.as_str(), "%Y%m%d").map_err(|e| {
        MatrixError::UnreadableProcessingLog {
            subject: subject.to_string(),
            reason: format!("bad date in run folder name {name:?}: {e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn newest_run_sorts_by_name() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("20240101-080000_aaa")).unwrap();
        fs::create_dir(temp.path().join("20240302-143055_bbb")).unwrap();
        fs::write(temp.path().join("stray.txt"), b"").unwrap();

        let run = newest_run(temp.path()).unwrap();
        assert!(run.ends_with("20240302-143055_bbb"));
    }

    #[test]
    fn no_runs_is_none() {
        let temp = tempdir().unwrap();
        assert!(newest_run(temp.path()).is_none());
        assert!(newest_run(&temp.path().join("absent")).is_none());
    }

    #[test]
    fn reads_recon_method_from_toml() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("pipeline.toml"),
            "[workflow]\nsurface_recon_method = \"mcribs\"\n",
        )
        .unwrap();
        assert_eq!(read_recon_method(temp.path(), "sub-1001").unwrap(), "mcribs");
    }

    #[test]
    fn missing_toml_is_fatal() {
        let temp = tempdir().unwrap();
        let err = read_recon_method(temp.path(), "sub-1001").unwrap_err();
        assert!(matches!(err, MatrixError::MissingProcessingLog { .. }));
    }

    #[test]
    fn malformed_toml_is_fatal() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("pipeline.toml"), "[workflow]\n").unwrap();
        let err = read_recon_method(temp.path(), "sub-1001").unwrap_err();
        assert!(matches!(err, MatrixError::UnreadableProcessingLog { .. }));
    }

    #[test]
    fn run_date_comes_from_folder_name() {
        let temp = tempdir().unwrap();
        let run = temp.path().join("20240302-143055_bbb");
        fs::create_dir(&run).unwrap();
        let date = extract_run_date(&run, "sub-1001").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());

        let bad = temp.path().join("no-date-here");
        fs::create_dir(&bad).unwrap();
        assert!(matches!(
            extract_run_date(&bad, "sub-1001"),
            Err(MatrixError::UnreadableProcessingLog { .. })
        ));
    }
}
