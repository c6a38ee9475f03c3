//! JSON progress file adapter.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use batchgen_core::{PersistenceError, ProgressState, ProgressStore};
use tracing::debug;

/// Stores progress as a small JSON document:
/// `{"completed": [...], "total": N, "last_index": I}`.
///
/// Writes go to a sibling temp file that is then renamed over the target, so
/// a crash mid-write leaves the previous snapshot intact.
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self) -> Result<ProgressState, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No progress file at {}, starting fresh", self.path.display());
                return Ok(ProgressState::default());
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| PersistenceError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn save(&self, state: &ProgressState) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(state).map_err(|e| PersistenceError::Write {
            path: self.path.clone(),
            source: std::io::Error::new(ErrorKind::InvalidData, e),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let temp = self.temp_path();
        std::fs::write(&temp, json).map_err(|e| self.write_error(e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| self.write_error(e))?;
        Ok(())
    }

    fn reset(&self) -> Result<(), PersistenceError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_error(e)),
        }
    }
}
