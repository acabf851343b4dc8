//! Key derivation for Loom.
//!
//! A passphrase is hashed once with SHA-256. The first half of the hex digest
//! becomes the encryption key; a short slice from the end becomes the verify
//! key, which is the only key material ever written to disk.
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the pushed repository (key4.db is encrypted)
//! - Silent typos in the passphrase (verify key check)
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Offline brute-force of weak passphrases (the hash is not memory-hard)

pub mod enroll;
pub mod key;
pub mod store;

pub use enroll::{obtain_key, verify_only, PassphrasePrompt};
pub use key::{hash_passphrase, EncryptKey, VerifyKey};
pub use store::VerifyKeyStore;
