mod backup;
mod restore;

pub use backup::handle_backup;
pub use restore::handle_restore;

use loom_core::LoomError;

use crate::errors::CliError;

/// Passphrase confirmation failures get the CLI's auth message shape;
/// everything else passes through.
fn map_key_error(err: LoomError) -> anyhow::Error {
    match err {
        LoomError::PassphraseMismatch | LoomError::IncorrectPassphrase => {
            anyhow::Error::new(CliError::auth_failed(err.to_string()))
        }
        other => other.into(),
    }
}
