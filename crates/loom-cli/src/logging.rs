//! Diagnostic logging to stderr.
//!
//! Standard output is reserved for command results (restored file content
//! in particular), so every log line goes to stderr.

use tracing_subscriber::EnvFilter;

use crate::constants::env_vars;
use crate::ui;

const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter =
        EnvFilter::try_from_env(env_vars::LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ui::stderr_color())
        .with_target(false)
        .without_time()
        .try_init();
}
