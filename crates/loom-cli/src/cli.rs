use std::ffi::OsString;

use clap::{Args, Parser, Subcommand};

use crate::constants::HELP_ALIASES;

/// Loom - back up Firefox Lockwise credentials to a git repository
#[derive(Parser, Debug)]
#[command(name = "loom")]
#[command(long_about = None)]
#[command(disable_help_flag = true, disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments for the `restore` command
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Original path of the credential file to restore
    #[arg(value_name = "PATH")]
    pub path: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decrypt an archived credential file to standard output
    Restore(RestoreArgs),
}

/// What the command line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Backup,
    Help,
    Restore { path: Option<String> },
    Unknown(String),
}

/// Parse process arguments (including the program name) into an
/// [`Invocation`].
///
/// The help aliases include `-help`, which clap would read as a cluster of
/// short flags, so they are matched before clap sees the arguments. Only
/// `restore` is handed to clap; anything else, including a bare `--`, is
/// unknown.
pub fn parse_invocation<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let first = args.get(1).map(|a| a.to_string_lossy().to_string());
    if let Some(first) = first.as_deref() {
        if HELP_ALIASES.contains(&first) {
            return Invocation::Help;
        }
        if first != "restore" {
            return Invocation::Unknown(first.to_string());
        }
    }

    match Cli::try_parse_from(&args) {
        Ok(Cli { command: None }) => Invocation::Backup,
        Ok(Cli {
            command: Some(Commands::Restore(restore)),
        }) => Invocation::Restore { path: restore.path },
        Err(_) => {
            let offending = if first.as_deref() == Some("restore") {
                args.get(3)
                    .or_else(|| args.get(2))
                    .map(|a| a.to_string_lossy().to_string())
            } else {
                first
            };
            Invocation::Unknown(offending.unwrap_or_default())
        }
    }
}
