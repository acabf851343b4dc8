//! Age encryption/decryption of archived files.
//!
//! The encrypt key text is used as an age passphrase: age wraps a random file
//! key with scrypt and encrypts the payload with ChaCha20-Poly1305 in
//! authenticated 64 KiB chunks, so files are streamed rather than buffered.

use std::io::{self, Read, Write};
use std::iter;

use age::secrecy::SecretString;

use crate::crypto::EncryptKey;
use crate::error::{LoomError, Result};

/// Encrypt everything read from `reader` into `writer`.
///
/// Returns the writer once the age stream has been finalized.
///
/// # Errors
///
/// Returns `LoomError::Crypto` if the age stream cannot be set up or
/// written.
pub fn encrypt_stream<R: Read, W: Write>(mut reader: R, writer: W, key: &EncryptKey) -> Result<W> {
    let encryptor =
        age::Encryptor::with_user_passphrase(SecretString::from(key.expose().to_string()));

    let mut stream = encryptor
        .wrap_output(writer)
        .map_err(|e| LoomError::Crypto(format!("Failed to create encryptor: {}", e)))?;

    io::copy(&mut reader, &mut stream)
        .map_err(|e| LoomError::Crypto(format!("Encryption write failed: {}", e)))?;

    stream
        .finish()
        .map_err(|e| LoomError::Crypto(format!("Encryption finish failed: {}", e)))
}

/// Decrypt an age stream from `reader` into `writer`.
///
/// Returns the number of plaintext bytes written.
///
/// # Errors
///
/// Returns `LoomError::IncorrectPassphrase` when the key does not open the
/// file, and `LoomError::Crypto` for corrupted or truncated input.
pub fn decrypt_stream<R: Read, W: Write>(reader: R, mut writer: W, key: &EncryptKey) -> Result<u64> {
    let decryptor = age::Decryptor::new(reader)
        .map_err(|e| LoomError::Crypto(format!("Failed to create decryptor: {}", e)))?;

    let identity = age::scrypt::Identity::new(SecretString::from(key.expose().to_string()));
    let mut stream = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|e| match e {
            age::DecryptError::NoMatchingKeys
            | age::DecryptError::DecryptionFailed
            | age::DecryptError::KeyDecryptionFailed => LoomError::IncorrectPassphrase,
            _ => LoomError::Crypto(format!("Decryption failed: {}", e)),
        })?;

    io::copy(&mut stream, &mut writer)
        .map_err(|e| LoomError::Crypto(format!("Failed to read decrypted data: {}", e)))
}
