//! Key derivation from a passphrase.
//!
//! One SHA-256 digest of the passphrase yields both keys:
//!
//! ```text
//! hex digest:  0 ............ 32 ...................... 56 ...... 64
//!              [ EncryptKey  ]                          [VerifyKey]
//! ```
//!
//! The two regions never overlap, so the persisted verify key reveals nothing
//! about the encryption key beyond what the hash itself leaks.

use std::fmt;
use std::ops::Range;

use sha2::{Digest, Sha256};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::error::{LoomError, Result};

/// Length of an encrypt key in hex characters (128 bits).
pub const ENCRYPT_KEY_HEX_LEN: usize = 32;

/// Length of a verify key in hex characters.
pub const VERIFY_KEY_HEX_LEN: usize = 8;

/// Hex range of the digest used for the encrypt key.
const ENCRYPT_KEY_RANGE: Range<usize> = 0..ENCRYPT_KEY_HEX_LEN;

/// Hex range of the digest used for the verify key (digest bytes 28..32).
const VERIFY_KEY_RANGE: Range<usize> = 56..64;

fn is_hex_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Symmetric key used to encrypt archived files.
///
/// Held only in memory for the duration of a run and zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct EncryptKey {
    hex: String,
}

impl EncryptKey {
    /// Parse a 32-character hex string.
    ///
    /// # Errors
    ///
    /// Returns `LoomError::InvalidKeyFormat` for any other length or a
    /// non-hex character.
    pub fn parse(value: &str) -> Result<Self> {
        if !is_hex_of_len(value, ENCRYPT_KEY_HEX_LEN) {
            return Err(LoomError::InvalidKeyFormat(format!(
                "encrypt key must be a hex string of length {}",
                ENCRYPT_KEY_HEX_LEN
            )));
        }
        Ok(Self {
            hex: value.to_string(),
        })
    }

    /// The key text handed to the cipher.
    ///
    /// Avoid storing or logging this value.
    pub fn expose(&self) -> &str {
        &self.hex
    }
}

impl fmt::Debug for EncryptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptKey")
            .field("hex", &"[REDACTED]")
            .finish()
    }
}

/// Short fingerprint confirming a passphrase without revealing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyKey(String);

impl VerifyKey {
    /// Parse an 8-character hex string.
    ///
    /// # Errors
    ///
    /// Returns `LoomError::InvalidKeyFormat` for any other length or a
    /// non-hex character.
    pub fn parse(value: &str) -> Result<Self> {
        if !is_hex_of_len(value, VERIFY_KEY_HEX_LEN) {
            return Err(LoomError::InvalidKeyFormat(format!(
                "verify key must be a hex string of length {}",
                VERIFY_KEY_HEX_LEN
            )));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerifyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the encrypt key and verify key from `passphrase`.
///
/// Deterministic: the same passphrase always yields the same pair.
pub fn hash_passphrase(passphrase: &str) -> (EncryptKey, VerifyKey) {
    let digest = Zeroizing::new(hex::encode(Sha256::digest(passphrase.as_bytes())));
    let encrypt_key = EncryptKey {
        hex: digest[ENCRYPT_KEY_RANGE].to_string(),
    };
    let verify_key = VerifyKey(digest[VERIFY_KEY_RANGE].to_string());
    (encrypt_key, verify_key)
}
