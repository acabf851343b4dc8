//! Persistence of the verify key marker (`.loom-verify.key`).

use std::path::{Path, PathBuf};

use crate::crypto::key::VerifyKey;
use crate::error::{LoomError, Result};
use crate::fs::{has_entry, write_atomic, EntryKind};

/// Reads and writes the verify key marker at a fixed path.
#[derive(Debug, Clone)]
pub struct VerifyKeyStore {
    path: PathBuf,
}

impl VerifyKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a marker has been recorded.
    pub fn exists(&self) -> Result<bool> {
        has_entry(&self.path, EntryKind::File)
    }

    /// Load the recorded verify key, if any.
    ///
    /// # Errors
    ///
    /// Fails when the marker is not a regular file or does not hold a valid
    /// verify key.
    pub fn load(&self) -> Result<Option<VerifyKey>> {
        if !self.exists()? {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        VerifyKey::parse(contents.trim_end())
            .map(Some)
            .map_err(|e| LoomError::InvalidKeyFormat(format!("{}: {}", self.path.display(), e)))
    }

    /// Record `verify_key`, replacing any previous marker.
    pub fn save(&self, verify_key: &VerifyKey) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_atomic(&self.path, verify_key.as_str().as_bytes())
    }
}
