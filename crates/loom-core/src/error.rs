//! Error types for Loom core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps them to
//! user-facing messages and a non-zero exit status.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Loom operations.
pub type Result<T> = std::result::Result<T, LoomError>;

/// Core error type for Loom operations.
#[derive(Debug, Error)]
pub enum LoomError {
    /// Path string rejected by validation (e.g. contains a NUL byte)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Key text with the wrong length or non-hex characters
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Path lies outside the home directory
    #[error("{} is not under home directory", .0.display())]
    PathNotUnderHome(PathBuf),

    /// Passphrase did not match the recorded verify key and cannot be re-asked
    #[error("Passphrase does not match record")]
    PassphraseMismatch,

    /// Decryption failed because the key is wrong
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// No verify key recorded in the repository
    #[error("No verify key found at {}. Run loom once to back up first.", .0.display())]
    MissingVerifyKey(PathBuf),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Git clone/commit/push failure
    #[error("Repository sync failed: {0}")]
    RepoSync(String),

    /// Encryption or decryption error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}
