//! # Loom Core
//!
//! Core library for Loom - a personal backup tool that mirrors Firefox Lockwise
//! credential files into a git repository, encrypting key material on the way.
//!
//! This crate provides the backup and restore workflow independent of the CLI
//! interface.
//!
//! ## Architecture
//!
//! - **path**: Path validation and home-directory containment checks
//! - **crypto**: Passphrase hashing, encrypt/verify keys, enrollment
//! - **encryption**: Streaming age encryption of archived files
//! - **discovery**: Lockwise file discovery in Firefox profiles
//! - **archive**: Mirroring source files into the repository and back out
//! - **repo**: Git clone, commit and push of the mirror
//! - **layout**: Per-run configuration values (home, repository, remote)

pub mod archive;
pub mod crypto;
pub mod discovery;
pub mod encryption;
pub mod error;
pub mod fs;
pub mod layout;
pub mod path;
pub mod repo;

pub use archive::{archive, restore};
pub use crypto::{
    hash_passphrase, obtain_key, verify_only, EncryptKey, PassphrasePrompt, VerifyKey,
    VerifyKeyStore,
};
pub use discovery::{find_lockwise_files, SourceFile};
pub use error::{LoomError, Result};
pub use layout::Layout;
pub use path::{is_under_home, SafePath};
pub use repo::RepoSync;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
