//! Mirroring source files into the repository and back out.
//!
//! A source at `<home>/<sub>` is archived to `<dest_root>/<sub>`. Files
//! marked for encryption are stored as age ciphertext; the rest are copied
//! byte for byte.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::crypto::EncryptKey;
use crate::discovery::SourceFile;
use crate::encryption::{decrypt_stream, encrypt_stream};
use crate::error::{LoomError, Result};
use crate::fs::{rename_with_fallback, set_owner_only, temp_sibling};
use crate::path::{home_relative, is_under_home};

/// Mirror path of `file` under `dest_root`.
///
/// # Errors
///
/// Returns `LoomError::PathNotUnderHome` when `file` is outside `home`.
pub fn mirror_path(file: &SourceFile, dest_root: &Path, home: &Path) -> Result<PathBuf> {
    Ok(dest_root.join(home_relative(&file.path, home)?))
}

/// Copy (or encrypt) `file` into its mirror location under `dest_root`.
///
/// A source outside `home` is skipped with a warning and yields `Ok(None)`,
/// so one bad file does not abort the run.
///
/// # Errors
///
/// Returns I/O or encryption errors raised while writing the mirror.
pub fn archive(
    file: &SourceFile,
    dest_root: &Path,
    home: &Path,
    key: &EncryptKey,
) -> Result<Option<PathBuf>> {
    if !is_under_home(&file.path, home) {
        warn!(
            "{} is not under home directory. Skip copying this file.",
            file.path
        );
        return Ok(None);
    }
    let dest = mirror_path(file, dest_root, home)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_sibling(&dest)?;
    if let Err(err) = write_mirror(file, &temp_path, key) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    set_owner_only(&temp_path)?;
    rename_with_fallback(&temp_path, &dest)?;

    info!(
        source = %file.path,
        dest = %dest.display(),
        encrypted = file.needs_encryption,
        "archived"
    );
    Ok(Some(dest))
}

fn write_mirror(file: &SourceFile, temp_path: &Path, key: &EncryptKey) -> Result<()> {
    if file.needs_encryption {
        let reader = BufReader::new(File::open(file.path.as_path())?);
        let writer = BufWriter::new(File::create(temp_path)?);
        let mut writer = encrypt_stream(reader, writer, key)?;
        writer.flush()?;
    } else {
        fs::copy(file.path.as_path(), temp_path)?;
    }
    Ok(())
}

/// Write the archived content of `file` to `out`, decrypting if needed.
///
/// # Errors
///
/// Unlike [`archive`], a source outside `home` is an error
/// (`LoomError::PathNotUnderHome`). A missing mirror yields
/// `LoomError::NotFound`; a wrong key yields `LoomError::IncorrectPassphrase`.
pub fn restore<W: Write>(
    file: &SourceFile,
    dest_root: &Path,
    home: &Path,
    key: &EncryptKey,
    mut out: W,
) -> Result<()> {
    let mirror = mirror_path(file, dest_root, home)?;
    let handle = match File::open(&mirror) {
        Ok(handle) => handle,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoomError::NotFound(format!(
                "no archived copy of {} at {}",
                file.path,
                mirror.display()
            )));
        }
        Err(err) => return Err(err.into()),
    };
    let mut reader = BufReader::new(handle);

    if file.needs_encryption {
        decrypt_stream(reader, &mut out, key)?;
    } else {
        std::io::copy(&mut reader, &mut out)?;
    }
    out.flush()?;
    Ok(())
}
