//! Filesystem utilities for atomic writes and file-type checks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{LoomError, Result};

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On some platforms (notably Windows), `fs::rename` fails if the destination already exists.
/// This function handles that case by removing the destination first and retrying.
///
/// If the rename ultimately fails, the temp file is cleaned up.
///
/// # Errors
///
/// Returns an error if the rename fails even after the fallback attempt.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        // Best-effort replace on platforms where rename fails if target exists.
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// Temporary sibling path used while `destination` is being written.
pub fn temp_sibling(destination: &Path) -> Result<PathBuf> {
    let parent = destination.parent().ok_or_else(|| {
        LoomError::InvalidPath(format!("{} has no parent directory", destination.display()))
    })?;
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LoomError::Other(format!("System time error: {}", e)))?
        .as_nanos();
    Ok(parent.join(format!(".{}.loom-{}.tmp", name, nanos)))
}

/// Write `data` to `destination` through a temporary sibling and a rename.
pub fn write_atomic(destination: &Path, data: &[u8]) -> Result<()> {
    let temp_path = temp_sibling(destination)?;
    if let Err(err) = fs::write(&temp_path, data) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    rename_with_fallback(&temp_path, destination)?;
    Ok(())
}

/// Restrict a file to owner read/write.
pub fn set_owner_only(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Expected kind of an existing filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Returns `Ok(true)` when `path` exists with the expected kind, `Ok(false)`
/// when it does not exist, and an error when it exists as something else.
pub fn has_entry(path: &Path, kind: EntryKind) -> Result<bool> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err.into()),
    };
    let matches = match kind {
        EntryKind::File => metadata.is_file(),
        EntryKind::Directory => metadata.is_dir(),
    };
    if matches {
        Ok(true)
    } else {
        let expected = match kind {
            EntryKind::File => "a file",
            EntryKind::Directory => "a directory",
        };
        Err(LoomError::InvalidPath(format!(
            "{} must be {}",
            path.display(),
            expected
        )))
    }
}
