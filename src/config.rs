//! Run configuration
//!
//! `RunSettings` describes one run (size, where output goes, which input file the unit reads). `RunDirs`
//! resolves and bootstraps the two directories the harness tracks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use harness_core::{SizeClass, StreamRole};

use crate::error::{HarnessError, HarnessResult};

/// Settings for a single run
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Instance size; selects the time budget
    pub size: SizeClass,
    /// Directory under which `output/` and `workFiles/` live
    pub output_root: PathBuf,
    /// File served by the façade's input stream
    pub input_file: PathBuf,
    /// Empty existing output and work directories before the run
    pub overwrite: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            size: SizeClass::Small,
            output_root: PathBuf::from("."),
            input_file: PathBuf::from("input.txt"),
            overwrite: false,
        }
    }
}

impl RunSettings {
    pub fn new(input_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: SizeClass) -> Self {
        self.size = size;
        self
    }

    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Working time the unit gets: nominal budget minus the cleanup reserve.
    pub fn effective_budget(&self) -> Duration {
        Duration::from_millis(self.size.effective_budget_ms())
    }

    pub fn dirs(&self) -> RunDirs {
        RunDirs::new(&self.output_root)
    }
}

/// Output and working directories tracked for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirs {
    pub output: PathBuf,
    pub work: PathBuf,
}

impl RunDirs {
    pub fn new(root: &Path) -> Self {
        Self {
            output: root.join(StreamRole::FinalOutput.dir_name()),
            work: root.join(StreamRole::WorkInProgress.dir_name()),
        }
    }

    pub fn for_role(&self, role: StreamRole) -> &Path {
        match role {
            StreamRole::WorkInProgress => &self.work,
            StreamRole::FinalOutput => &self.output,
        }
    }

    pub fn all(&self) -> [&Path; 2] {
        [&self.output, &self.work]
    }

    /// Create both directories, emptying existing ones when `overwrite` is set.
    pub fn bootstrap(&self, overwrite: bool) -> HarnessResult<()> {
        for dir in self.all() {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .map_err(|e| HarnessError::io(format!("creating {}", dir.display()), e))?;
            } else if overwrite {
                empty_dir(dir)?;
            }
        }
        Ok(())
    }
}

fn empty_dir(dir: &Path) -> HarnessResult<()> {
    let entries = fs::read_dir(dir).map_err(|e| HarnessError::io(format!("reading {}", dir.display()), e))?;
    for entry in entries.flatten() {
        let path = entry.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| HarnessError::io(format!("removing {}", path.display()), e))?;
    }
    Ok(())
}

/// Check that `root` exists and is a directory. The harness never creates the root itself.
pub fn validate_output_root(root: &Path) -> HarnessResult<()> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(HarnessError::InvalidOutputRoot {
            path: root.to_path_buf(),
            reason: "is not a valid directory",
        }),
        Err(_) => Err(HarnessError::InvalidOutputRoot {
            path: root.to_path_buf(),
            reason: "is unknown",
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RunSettings::default();
        assert_eq!(settings.size, SizeClass::Small);
        assert!(!settings.overwrite);
        assert_eq!(settings.effective_budget(), Duration::from_millis(25_000));
    }

    #[test]
    fn test_builder_chain() {
        let settings = RunSettings::new("in.csv")
            .with_size(SizeClass::Large)
            .with_output_root("/tmp/run")
            .with_overwrite(true);
        assert_eq!(settings.input_file, PathBuf::from("in.csv"));
        assert_eq!(settings.effective_budget(), Duration::from_millis(295_000));
        assert_eq!(settings.dirs().output, PathBuf::from("/tmp/run/output"));
        assert_eq!(settings.dirs().work, PathBuf::from("/tmp/run/workFiles"));
        assert!(settings.overwrite);
    }

    #[test]
    fn test_bootstrap_creates_dirs() {
        let root = tempfile::tempdir().unwrap();
        let dirs = RunDirs::new(root.path());
        dirs.bootstrap(false).unwrap();
        assert!(dirs.output.is_dir());
        assert!(dirs.work.is_dir());
    }

    #[test]
    fn test_bootstrap_overwrite_empties_existing() {
        let root = tempfile::tempdir().unwrap();
        let dirs = RunDirs::new(root.path());
        dirs.bootstrap(false).unwrap();
        fs::write(dirs.output.join("stale.txt"), "old").unwrap();
        fs::create_dir(dirs.work.join("nested")).unwrap();

        dirs.bootstrap(false).unwrap();
        assert!(dirs.output.join("stale.txt").exists());

        dirs.bootstrap(true).unwrap();
        assert_eq!(fs::read_dir(&dirs.output).unwrap().count(), 0);
        assert_eq!(fs::read_dir(&dirs.work).unwrap().count(), 0);
    }

    #[test]
    fn test_validate_output_root() {
        let root = tempfile::tempdir().unwrap();
        assert!(validate_output_root(root.path()).is_ok());

        let file = root.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = validate_output_root(&file).unwrap_err();
        assert!(err.to_string().ends_with("is not a valid directory"));

        let err = validate_output_root(&root.path().join("missing")).unwrap_err();
        assert!(err.to_string().ends_with("is unknown"));
    }
}
