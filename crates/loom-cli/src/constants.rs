//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// Loom only distinguishes success from failure; every error, including
/// usage mistakes, exits with 1.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;

    /// Any failure (usage, missing file, wrong passphrase, git error).
    pub const FAILURE: i32 = 1;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    /// Config file path override.
    pub const CONFIG: &str = "LOOM_CONFIG";

    /// Remote URL override.
    pub const REMOTE: &str = "LOOM_REMOTE";

    /// Non-interactive passphrase.
    pub const PASSPHRASE: &str = "LOOM_PASSPHRASE";

    /// Tracing filter directive.
    pub const LOG: &str = "LOOM_LOG";
}

/// First arguments that print usage.
pub const HELP_ALIASES: [&str; 4] = ["help", "--help", "-help", "-h"];

pub const USAGE: &str = "\
Usage:
  loom                  Back up Firefox Lockwise files to ~/loom and push
  loom restore <path>   Decrypt an archived file to standard output
  loom help             Show this message

Environment:
  LOOM_PASSPHRASE       Passphrase for non-interactive runs
  LOOM_REMOTE           Remote URL (default git@github.com:$USER/loom.git)
  LOOM_CONFIG           Config file (default ~/.config/loom/config.toml)
  LOOM_LOG              Log filter, e.g. info or debug (default warn)";
