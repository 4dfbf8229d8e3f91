use std::{fs, io, path::PathBuf};

use crate::error::AppError;

/// Single-slot record of the last activated profile
#[derive(Debug, Clone)]
pub struct LockStore {
    path: PathBuf,
}

impl LockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the recorded profile name. A missing, empty or unreadable file reads as `None`.
    pub fn read(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let name = contents.trim();
                (!name.is_empty()).then(|| name.to_string())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("ignoring unreadable lock file {}: {err}", self.path.display());
                None
            }
        }
    }

    /// Replaces the record with `name`
    pub fn write(&self, name: &str) -> Result<(), AppError> {
        fs::write(&self.path, name)?;
        log::info!("recorded active profile '{name}' in {}", self.path.display());
        Ok(())
    }
}
