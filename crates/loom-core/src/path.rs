//! Path validation and home-directory containment.
//!
//! Every path loom reads from or writes to passes through [`SafePath`], and
//! every source file is checked with [`is_under_home`] before it is copied
//! into or restored out of the repository.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{LoomError, Result};

/// An absolute, lexically normalized path that contains no NUL byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validate and normalize `raw`, resolving relative paths against the
    /// current working directory.
    ///
    /// # Errors
    ///
    /// Returns `LoomError::InvalidPath` if `raw` contains a NUL byte, and an
    /// I/O error if the current directory cannot be read for a relative path.
    pub fn new(raw: impl AsRef<OsStr>) -> Result<Self> {
        let raw = Path::new(raw.as_ref());
        reject_nul(raw)?;
        if raw.is_absolute() {
            Ok(Self(normalize_lexically(raw)))
        } else {
            let cwd = std::env::current_dir()?;
            Ok(Self(normalize_lexically(&cwd.join(raw))))
        }
    }

    /// Validate `raw`, resolving relative paths against `base` instead of the
    /// current directory.
    pub fn resolve_against(raw: impl AsRef<OsStr>, base: &Path) -> Result<Self> {
        let raw = Path::new(raw.as_ref());
        reject_nul(raw)?;
        reject_nul(base)?;
        Ok(Self(normalize_lexically(&base.join(raw))))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for SafePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SafePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

fn reject_nul(path: &Path) -> Result<()> {
    if path.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(LoomError::InvalidPath(
            "path cannot contain NUL character".to_string(),
        ));
    }
    Ok(())
}

/// Drop `.` components and fold `..` into its parent without touching the
/// filesystem. `..` at the root stays at the root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// True iff `path` lies strictly inside `home`.
///
/// The comparison is component-wise, so `/home/alice2` is not under
/// `/home/alice`, and `home` itself does not count as inside.
pub fn is_under_home(path: &SafePath, home: &Path) -> bool {
    match path.as_path().strip_prefix(home) {
        Ok(rest) => !rest.as_os_str().is_empty(),
        Err(_) => false,
    }
}

/// The sub-path of `path` below `home`.
///
/// # Errors
///
/// Returns `LoomError::PathNotUnderHome` when the containment check fails.
pub fn home_relative(path: &SafePath, home: &Path) -> Result<PathBuf> {
    if !is_under_home(path, home) {
        return Err(LoomError::PathNotUnderHome(path.as_path().to_path_buf()));
    }
    path.as_path()
        .strip_prefix(home)
        .map(Path::to_path_buf)
        .map_err(|_| LoomError::PathNotUnderHome(path.as_path().to_path_buf()))
}
