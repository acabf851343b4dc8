//! Terminal detection for colored output.

use std::io::IsTerminal;

/// Whether color is allowed on stderr.
///
/// Disabled when stderr is not a TTY, `NO_COLOR` is set, or `TERM=dumb`.
pub fn stderr_color() -> bool {
    let term_is_dumb = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
    let no_color_env = std::env::var("NO_COLOR").is_ok();
    std::io::stderr().is_terminal() && !no_color_env && !term_is_dumb
}
