use std::path::PathBuf;

use tracing::{info, warn};

use loom_core::{archive, find_lockwise_files, obtain_key, Layout, RepoSync, VerifyKeyStore};

use crate::prompt::passphrase_prompt;

use super::map_key_error;

/// Full backup: ensure the repository, derive the key, mirror the Lockwise
/// files, then commit and push.
pub fn handle_backup(layout: &Layout) -> anyhow::Result<()> {
    let repo = RepoSync::new(layout);
    repo.ensure_repo()?;

    let store = VerifyKeyStore::new(layout.verify_key_path());
    let mut prompt = passphrase_prompt()?;
    let key = obtain_key(&store, prompt.as_mut()).map_err(map_key_error)?;

    let sources = find_lockwise_files(&layout.firefox_dir, &layout.profile_pattern)?;
    if sources.is_empty() {
        warn!(
            dir = %layout.firefox_dir.display(),
            pattern = %layout.profile_pattern,
            "no Lockwise files found"
        );
    }

    let mut archived: Vec<PathBuf> = Vec::with_capacity(sources.len());
    for source in &sources {
        if let Some(dest) = archive(source, &layout.repo_root, &layout.home, &key)? {
            archived.push(dest);
        }
    }
    if !sources.is_empty() && archived.is_empty() {
        return Err(anyhow::anyhow!(
            "None of the Lockwise files are under {}; nothing was backed up",
            layout.home.display()
        ));
    }

    let outcome = repo.commit_and_push(&archived)?;
    info!(?outcome, "sync finished");

    println!(
        "Backed up {} file{} to {}",
        archived.len(),
        if archived.len() == 1 { "" } else { "s" },
        layout.repo_root.display()
    );
    Ok(())
}
