//! Per-run configuration values.
//!
//! A [`Layout`] is built once at process start and passed to every
//! operation, so nothing below the CLI reads the environment.

use std::path::{Path, PathBuf};

/// Directory name of the repository under home.
pub const REPO_DIR_NAME: &str = "loom";

/// Verify key marker file at the repository root.
pub const VERIFY_KEY_FILE: &str = ".loom-verify.key";

pub const GITIGNORE_FILE: &str = ".gitignore";

/// Profile directory pattern; only the default profile, not nightly etc.
pub const DEFAULT_PROFILE_PATTERN: &str = "*.default";

pub const DEFAULT_REMOTE_HOST: &str = "git@github.com";

pub const DEFAULT_BRANCH: &str = "master";

/// Filesystem and remote locations used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Home directory; sources must live under it.
    pub home: PathBuf,
    /// Git working tree that mirrors archived files.
    pub repo_root: PathBuf,
    /// Firefox profiles directory.
    pub firefox_dir: PathBuf,
    /// Glob pattern selecting profile directories inside `firefox_dir`.
    pub profile_pattern: String,
    /// Remote the repository is cloned from and pushed to.
    pub remote: String,
    /// Remote branch receiving pushes.
    pub branch: String,
}

impl Layout {
    /// Default layout for `home`, pushing to `remote`.
    pub fn new(home: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        let home = home.into();
        Self {
            repo_root: home.join(REPO_DIR_NAME),
            firefox_dir: home.join(".mozilla").join("firefox"),
            profile_pattern: DEFAULT_PROFILE_PATTERN.to_string(),
            remote: remote.into(),
            branch: DEFAULT_BRANCH.to_string(),
            home,
        }
    }

    pub fn verify_key_path(&self) -> PathBuf {
        self.repo_root.join(VERIFY_KEY_FILE)
    }

    pub fn gitignore_path(&self) -> PathBuf {
        self.repo_root.join(GITIGNORE_FILE)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

/// Conventioned remote URL: `<host>:<user>/loom.git`.
///
/// Assumes the local username matches the account name on the host.
pub fn default_remote(host: &str, user: &str) -> String {
    format!("{}:{}/{}.git", host, user, REPO_DIR_NAME)
}
