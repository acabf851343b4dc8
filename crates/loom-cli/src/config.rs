//! Config file and environment resolution into a [`Layout`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

use loom_core::layout::{default_remote, DEFAULT_REMOTE_HOST};
use loom_core::{Layout, SafePath};

use crate::constants::env_vars;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoomConfig {
    #[serde(default)]
    pub repo: RepoSection,
    #[serde(default)]
    pub firefox: FirefoxSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoSection {
    pub path: Option<String>,
    pub remote: Option<String>,
    pub remote_host: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FirefoxSection {
    pub profiles_dir: Option<String>,
    pub profile_pattern: Option<String>,
}

/// Environment inputs, captured once so resolution stays testable.
#[derive(Debug, Default, Clone)]
pub struct Env {
    pub home: Option<String>,
    pub user: Option<String>,
    pub remote: Option<String>,
}

impl Env {
    pub fn capture() -> Self {
        Self {
            home: non_empty_var("HOME"),
            user: non_empty_var("USER").or_else(|| non_empty_var("LOGNAME")),
            remote: non_empty_var(env_vars::REMOTE),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

/// Resolve the config file path, checking LOOM_CONFIG first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Some(value) = non_empty_var(env_vars::CONFIG) {
        return Ok(PathBuf::from(value));
    }
    default_config_path()
}

pub fn read_config(path: &Path) -> anyhow::Result<LoomConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Some(value) = non_empty_var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(value).join("loom"));
    }
    Ok(home_dir(&Env::capture())?.join(".config").join("loom"))
}

fn home_dir(env: &Env) -> anyhow::Result<PathBuf> {
    let home = env
        .home
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(SafePath::new(home)?.into_path_buf())
}

/// Build the run's layout from the config file (if present) and environment.
pub fn load_layout() -> anyhow::Result<Layout> {
    let config_path = resolve_config_path()?;
    let config = if config_path.exists() {
        read_config(&config_path)?
    } else {
        LoomConfig::default()
    };
    resolve_layout(&config, &Env::capture())
}

/// Precedence for the remote: LOOM_REMOTE, then `repo.remote`, then
/// `repo.remote_host` (or the default host) combined with the username.
pub fn resolve_layout(config: &LoomConfig, env: &Env) -> anyhow::Result<Layout> {
    let home = home_dir(env)?;

    let remote = match (env.remote.as_ref(), config.repo.remote.as_ref()) {
        (Some(remote), _) | (None, Some(remote)) => remote.clone(),
        (None, None) => {
            let user = env.user.as_deref().ok_or_else(|| {
                anyhow::anyhow!("USER is not set; set LOOM_REMOTE or repo.remote in the config")
            })?;
            let host = config
                .repo
                .remote_host
                .as_deref()
                .unwrap_or(DEFAULT_REMOTE_HOST);
            default_remote(host, user)
        }
    };

    let mut layout = Layout::new(&home, remote);
    if let Some(path) = config.repo.path.as_deref() {
        layout.repo_root = SafePath::resolve_against(path, &home)?.into_path_buf();
    }
    if let Some(branch) = config.repo.branch.as_deref() {
        if branch.trim().is_empty() {
            return Err(anyhow::anyhow!("repo.branch cannot be empty"));
        }
        layout.branch = branch.to_string();
    }
    if let Some(dir) = config.firefox.profiles_dir.as_deref() {
        layout.firefox_dir = SafePath::resolve_against(dir, &home)?.into_path_buf();
    }
    if let Some(pattern) = config.firefox.profile_pattern.as_deref() {
        layout.profile_pattern = pattern.to_string();
    }
    Ok(layout)
}
