use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};

use crate::{Result, ScanError};

const DEFAULT_SUBJECT_PREFIX: &str = "sub-";

/// Lists subject folders under a data root.
pub struct SubjectScanner {
    root: PathBuf,
    prefix: String,
}

impl SubjectScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_prefix(root, DEFAULT_SUBJECT_PREFIX)
    }

    pub fn with_prefix(root: impl AsRef<Path>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            prefix: prefix.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Sorted subject folder names under the root.
    ///
    /// Skips plain files (pipeline reports like `sub-1001.html` live next to
    /// the folders) and anything not carrying the subject prefix.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(ScanError::MissingRoot(self.root.clone()));
        }

        let mut subjects = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("failed to read entry under {}: {e}", self.root.display());
                    continue;
                }
            };
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with(&self.prefix) {
                subjects.push(name);
            }
        }
        subjects.sort();
        log::debug!("found {} subject folders in {}", subjects.len(), self.root.display());
        Ok(subjects)
    }
}

pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    Ok(Glob::new(pattern)?.compile_matcher())
}

/// Does `dir` contain an entry whose file name matches the glob?
///
/// Session folders are flat, so no recursion. A missing or unreadable
/// directory is `false`.
pub fn dir_has_match(dir: &Path, matcher: &GlobMatcher) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    for entry in entries.flatten() {
        if matcher.is_match(Path::new(&entry.file_name())) {
            return true;
        }
    }
    false
}

/// Does `dir` exist and hold at least one entry?
pub fn dir_is_nonempty(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}
