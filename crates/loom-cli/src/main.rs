//! Loom CLI - back up Firefox Lockwise credentials to a git repository
//!
//! Running `loom` with no arguments encrypts the Lockwise files into
//! `~/loom`, commits, and pushes. `loom restore <path>` decrypts one
//! archived file to standard output.

mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod logging;
mod prompt;
mod ui;

use cli::{parse_invocation, Invocation};
use commands::{handle_backup, handle_restore};
use config::load_layout;
use constants::{exit_codes, USAGE};
use errors::CliError;

fn main() {
    logging::init();

    let result = match parse_invocation(std::env::args_os()) {
        Invocation::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Invocation::Unknown(arg) => CliError::usage(format!("Unknown argument: {}", arg)).exit(),
        Invocation::Backup => run_backup(),
        Invocation::Restore { path } => run_restore(path.as_deref()),
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            if let Some(cli_err) = err.downcast_ref::<CliError>() {
                cli_err.exit();
            }
            report(&err);
            exit_codes::FAILURE
        }
    };
    std::process::exit(code);
}

fn run_backup() -> anyhow::Result<()> {
    let layout = load_layout()?;
    handle_backup(&layout)
}

fn run_restore(path: Option<&str>) -> anyhow::Result<()> {
    let path = path.ok_or_else(|| CliError::usage("restore requires a <path> argument"))?;
    let layout = load_layout()?;
    handle_restore(&layout, path)
}

fn report(err: &anyhow::Error) {
    use owo_colors::OwoColorize;

    let label = if ui::stderr_color() {
        "Error:".red().bold().to_string()
    } else {
        "Error:".to_string()
    };
    eprintln!("{} {:#}", label, err);
}
