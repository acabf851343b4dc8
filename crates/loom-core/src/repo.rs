//! Git synchronization of the mirror repository.
//!
//! Shells out to the `git` executable. There is no merge or conflict
//! handling: any failing git command aborts the run, and a commit whose push
//! failed stays local until the next run pushes again.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

use crate::error::{LoomError, Result};
use crate::fs::{has_entry, EntryKind};
use crate::layout::{Layout, GITIGNORE_FILE, VERIFY_KEY_FILE};

/// What `commit_and_push` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub committed: bool,
    pub pushed: bool,
}

/// Git operations on the repository root of a [`Layout`].
#[derive(Debug, Clone)]
pub struct RepoSync {
    work_tree: PathBuf,
    gitignore: PathBuf,
    remote: String,
    branch: String,
}

impl RepoSync {
    pub fn new(layout: &Layout) -> Self {
        Self {
            work_tree: layout.repo_root.clone(),
            gitignore: layout.gitignore_path(),
            remote: layout.remote.clone(),
            branch: layout.branch.clone(),
        }
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// Whether the repository root already holds a git checkout.
    ///
    /// # Errors
    ///
    /// Fails when the root or its `.git` exists but is not a directory.
    pub fn has_repo(&self) -> Result<bool> {
        if !has_entry(&self.work_tree, EntryKind::Directory).map_err(as_sync_error)? {
            return Ok(false);
        }
        has_entry(&self.work_tree.join(".git"), EntryKind::Directory).map_err(as_sync_error)
    }

    /// Clone the remote into the repository root unless a checkout exists.
    ///
    /// A fresh clone gets a `.gitignore` excluding the verify key marker,
    /// staged for the next commit.
    pub fn ensure_repo(&self) -> Result<()> {
        if self.has_repo()? {
            debug!(path = %self.work_tree.display(), "repository present");
            return Ok(());
        }
        info!(remote = %self.remote, path = %self.work_tree.display(), "cloning repository");
        let mut clone = Command::new("git");
        clone
            .arg("clone")
            .arg(&self.remote)
            .arg(&self.work_tree);
        run(clone, "clone")?;

        if self.ensure_gitignore()? {
            self.git(["add", "--", GITIGNORE_FILE])?;
        }
        Ok(())
    }

    /// Make sure `.gitignore` lists the verify key marker. Returns whether
    /// the file changed.
    fn ensure_gitignore(&self) -> Result<bool> {
        let existing = match fs::read_to_string(&self.gitignore) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };
        if existing.lines().any(|line| line.trim() == VERIFY_KEY_FILE) {
            return Ok(false);
        }
        let mut contents = existing;
        if !contents.is_empty() && !contents.ends_with('\n') {
            contents.push('\n');
        }
        contents.push_str(VERIFY_KEY_FILE);
        contents.push('\n');
        fs::write(&self.gitignore, contents)?;
        Ok(true)
    }

    /// Stage `paths`, commit with a timestamped message if anything is
    /// staged, then push `HEAD` to the remote branch.
    ///
    /// # Errors
    ///
    /// Any git failure is returned as `LoomError::RepoSync`.
    pub fn commit_and_push(&self, paths: &[PathBuf]) -> Result<SyncOutcome> {
        if !paths.is_empty() {
            let mut args: Vec<&OsStr> = vec![OsStr::new("add"), OsStr::new("--")];
            args.extend(paths.iter().map(|p| p.as_os_str()));
            self.git(args)?;
        }

        let committed = if self.has_staged_changes()? {
            let message = commit_message();
            self.git(["commit", "-m", message.as_str()])?;
            info!(%message, "committed");
            true
        } else {
            info!("nothing to commit");
            false
        };

        let pushed = if self.has_head()? {
            let refspec = format!("HEAD:refs/heads/{}", self.branch);
            self.git(["push", self.remote.as_str(), refspec.as_str()])?;
            info!(remote = %self.remote, branch = %self.branch, "pushed");
            true
        } else {
            info!("no commits to push");
            false
        };

        Ok(SyncOutcome { committed, pushed })
    }

    fn has_staged_changes(&self) -> Result<bool> {
        let output = self.git_output(["diff", "--cached", "--quiet"])?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(command_failed("diff --cached", &output)),
        }
    }

    fn has_head(&self) -> Result<bool> {
        let output = self.git_output(["rev-parse", "--verify", "--quiet", "HEAD"])?;
        Ok(output.status.success())
    }

    fn git<I, S>(&self, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let label = args
            .first()
            .map(|a| a.as_ref().to_string_lossy().to_string())
            .unwrap_or_default();
        let mut command = Command::new("git");
        command.current_dir(&self.work_tree).args(&args);
        run(command, &label)
    }

    fn git_output<I, S>(&self, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new("git")
            .current_dir(&self.work_tree)
            .args(args)
            .output()
            .map_err(|e| LoomError::RepoSync(format!("failed to run git: {}", e)))
    }
}

/// `:new: <ISO-8601 UTC timestamp>`
pub fn commit_message() -> String {
    format!(
        ":new: {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

fn run(mut command: Command, label: &str) -> Result<Output> {
    let output = command
        .output()
        .map_err(|e| LoomError::RepoSync(format!("failed to run git {}: {}", label, e)))?;
    if !output.status.success() {
        return Err(command_failed(label, &output));
    }
    Ok(output)
}

fn command_failed(label: &str, output: &Output) -> LoomError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    LoomError::RepoSync(format!(
        "git {} exited with {}: {}",
        label,
        output.status,
        stderr.trim()
    ))
}

fn as_sync_error(err: LoomError) -> LoomError {
    match err {
        LoomError::InvalidPath(message) => LoomError::RepoSync(message),
        other => other,
    }
}
