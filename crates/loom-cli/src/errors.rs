//! CLI error types for structured error handling.
//!
//! Each variant prints its own message shape; all of them exit with the
//! single failure code.

use std::fmt;

use owo_colors::OwoColorize;

use crate::constants::{exit_codes, USAGE};
use crate::ui;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Unrecognized or malformed arguments; usage is printed alongside
    Usage(String),

    /// Resource not found (credential file, archived copy)
    NotFound { message: String, hint: String },

    /// Passphrase could not be confirmed
    AuthFailed { message: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(message) => write!(f, "{}", message),
            CliError::NotFound { message, hint } => write!(f, "{}\n{}", message, hint),
            CliError::AuthFailed { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(message.into())
    }

    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        exit_codes::FAILURE
    }

    /// Print error message to stderr and exit.
    pub fn exit(&self) -> ! {
        let label = if ui::stderr_color() {
            "Error:".red().bold().to_string()
        } else {
            "Error:".to_string()
        };
        eprintln!("{} {}", label, self);
        if matches!(self, CliError::Usage(_)) {
            eprintln!("\n{}", USAGE);
        }
        std::process::exit(self.exit_code())
    }
}
