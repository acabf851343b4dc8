use std::io::Write;

use loom_core::{
    find_lockwise_files, is_under_home, restore, verify_only, Layout, LoomError, SafePath,
    SourceFile, VerifyKeyStore,
};

use crate::errors::CliError;
use crate::prompt::passphrase_prompt;

use super::map_key_error;

/// Write the archived copy of `raw_path` to stdout.
///
/// The path is resolved against the discovered Lockwise files before any
/// passphrase is asked for.
pub fn handle_restore(layout: &Layout, raw_path: &str) -> anyhow::Result<()> {
    let source = resolve_source(layout, raw_path)?;
    if !is_under_home(&source.path, &layout.home) {
        return Err(LoomError::PathNotUnderHome(source.path.into_path_buf()).into());
    }

    let store = VerifyKeyStore::new(layout.verify_key_path());
    let mut prompt = passphrase_prompt()?;
    let key = verify_only(&store, prompt.as_mut()).map_err(map_key_error)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    restore(&source, &layout.repo_root, &layout.home, &key, &mut out).map_err(|err| match err {
        LoomError::NotFound(message) => anyhow::Error::new(CliError::not_found(
            message,
            "Hint: run loom without arguments to back it up first.",
        )),
        other => other.into(),
    })?;
    out.flush()?;
    Ok(())
}

fn resolve_source(layout: &Layout, raw_path: &str) -> anyhow::Result<SourceFile> {
    let requested = SafePath::new(raw_path)?;
    let candidates = find_lockwise_files(&layout.firefox_dir, &layout.profile_pattern)?;
    candidates
        .into_iter()
        .find(|candidate| candidate.path == requested)
        .ok_or_else(|| {
            let known = known_paths(layout);
            anyhow::Error::new(CliError::not_found(
                format!("{} is not a recognized Lockwise file", requested),
                known,
            ))
        })
}

fn known_paths(layout: &Layout) -> String {
    match find_lockwise_files(&layout.firefox_dir, &layout.profile_pattern) {
        Ok(found) if !found.is_empty() => {
            let lines: Vec<String> = found.iter().map(|f| format!("  {}", f.path)).collect();
            format!("Restorable files:\n{}", lines.join("\n"))
        }
        _ => format!(
            "No Lockwise files found under {}",
            layout.firefox_dir.display()
        ),
    }
}
