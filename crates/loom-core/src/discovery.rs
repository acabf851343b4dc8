//! Lockwise credential file discovery.
//!
//! Firefox keeps saved logins in `logins.json` and the key that protects
//! them in `key4.db`, both inside the profile directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LoomError, Result};
use crate::path::SafePath;

pub const LOGINS_FILE: &str = "logins.json";
pub const KEY4_FILE: &str = "key4.db";

/// A credential file to mirror into the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: SafePath,
    pub needs_encryption: bool,
}

impl SourceFile {
    pub fn new(path: SafePath, needs_encryption: bool) -> Self {
        Self {
            path,
            needs_encryption,
        }
    }
}

/// Outcome of globbing for one file across profiles.
#[derive(Debug, PartialEq, Eq)]
enum ProfileMatch {
    Unique(PathBuf),
    Missing,
    Ambiguous(usize),
}

impl ProfileMatch {
    fn from_candidates(mut candidates: Vec<PathBuf>) -> Self {
        match candidates.len() {
            0 => Self::Missing,
            1 => Self::Unique(candidates.remove(0)),
            n => Self::Ambiguous(n),
        }
    }
}

/// Find the Lockwise files of the single default profile.
///
/// A file found in zero or several profiles is treated as absent. `key4.db`
/// comes first and is marked for encryption; `logins.json` is copied as is.
///
/// # Errors
///
/// Fails only if the pattern is malformed or a matched path is invalid.
pub fn find_lockwise_files(firefox_dir: &Path, profile_pattern: &str) -> Result<Vec<SourceFile>> {
    let mut found = Vec::with_capacity(2);
    for (file_name, needs_encryption) in [(KEY4_FILE, true), (LOGINS_FILE, false)] {
        match glob_profiles(firefox_dir, profile_pattern, file_name)? {
            ProfileMatch::Unique(path) => {
                found.push(SourceFile::new(SafePath::new(path)?, needs_encryption));
            }
            ProfileMatch::Missing => {
                debug!(file = file_name, "no profile contains file");
            }
            ProfileMatch::Ambiguous(count) => {
                debug!(file = file_name, count, "file found in several profiles; ignoring");
            }
        }
    }
    Ok(found)
}

fn glob_profiles(firefox_dir: &Path, profile_pattern: &str, file_name: &str) -> Result<ProfileMatch> {
    let pattern = format!(
        "{}/{}/{}",
        glob::Pattern::escape(&firefox_dir.to_string_lossy()),
        profile_pattern,
        file_name
    );
    let paths = glob::glob(&pattern)
        .map_err(|e| LoomError::InvalidPath(format!("bad profile pattern {}: {}", pattern, e)))?;
    let candidates = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                debug!(error = %err, "skipping unreadable glob entry");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    Ok(ProfileMatch::from_candidates(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_logins_only() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("abcd.default").join(LOGINS_FILE));

        let found = find_lockwise_files(dir.path(), "*.default").unwrap();

        assert_eq!(found.len(), 1);
        assert!(!found[0].needs_encryption);
        assert!(found[0].path.as_path().ends_with("abcd.default/logins.json"));
    }

    #[test]
    fn test_both_files_key4_first() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("abcd.default").join(LOGINS_FILE));
        touch(&dir.path().join("abcd.default").join(KEY4_FILE));

        let found = find_lockwise_files(dir.path(), "*.default").unwrap();

        assert_eq!(found.len(), 2);
        assert!(found[0].needs_encryption);
        assert!(found[0].path.as_path().ends_with(KEY4_FILE));
        assert!(!found[1].needs_encryption);
        assert!(found[1].path.as_path().ends_with(LOGINS_FILE));
    }

    #[test]
    fn test_ambiguous_key4_treated_as_absent() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("aaaa.default").join(KEY4_FILE));
        touch(&dir.path().join("bbbb.default").join(KEY4_FILE));
        touch(&dir.path().join("aaaa.default").join(LOGINS_FILE));

        let found = find_lockwise_files(dir.path(), "*.default").unwrap();

        assert_eq!(found.len(), 1);
        assert!(found[0].path.as_path().ends_with(LOGINS_FILE));
    }

    #[test]
    fn test_other_profiles_ignored() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("abcd.default-nightly").join(KEY4_FILE));
        touch(&dir.path().join("abcd.default-release").join(LOGINS_FILE));

        let found = find_lockwise_files(dir.path(), "*.default").unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn test_missing_firefox_dir() {
        let dir = tempdir().unwrap();
        let found = find_lockwise_files(&dir.path().join("nope"), "*.default").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_glob_metacharacters_in_dir_escaped() {
        let dir = tempdir().unwrap();
        let firefox = dir.path().join("fire[fox]");
        touch(&firefox.join("abcd.default").join(LOGINS_FILE));

        let found = find_lockwise_files(&firefox, "*.default").unwrap();

        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_profile_match_from_candidates() {
        assert_eq!(ProfileMatch::from_candidates(vec![]), ProfileMatch::Missing);
        assert_eq!(
            ProfileMatch::from_candidates(vec![PathBuf::from("/a")]),
            ProfileMatch::Unique(PathBuf::from("/a"))
        );
        assert_eq!(
            ProfileMatch::from_candidates(vec![PathBuf::from("/a"), PathBuf::from("/b")]),
            ProfileMatch::Ambiguous(2)
        );
    }
}
