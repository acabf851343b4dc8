//! Passphrase enrollment and verification.
//!
//! Two states, decided by whether a verify key marker exists:
//!
//! - **Enroll** (no marker): ask for the passphrase twice, record the derived
//!   verify key once both entries agree.
//! - **Verify** (marker present): ask once, compare the derived verify key
//!   against the recorded one.
//!
//! Mismatches re-prompt for as long as the prompt can ask again.

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::key::{hash_passphrase, EncryptKey, VerifyKey};
use crate::crypto::store::VerifyKeyStore;
use crate::error::{LoomError, Result};

pub const RECORD_MISMATCH_MESSAGE: &str =
    "Passphrase does not match record, probably because of typos. Try again.";
pub const REPEAT_MISMATCH_MESSAGE: &str = "Repeated passphrase does not match. Try again.";
pub const EMPTY_PASSPHRASE_MESSAGE: &str = "Passphrase cannot be empty. Try again.";

/// Source of passphrases for key derivation.
pub trait PassphrasePrompt {
    /// Ask for the passphrase.
    fn passphrase(&mut self) -> Result<Zeroizing<String>>;

    /// Ask for the passphrase a second time during enrollment.
    fn repeated_passphrase(&mut self) -> Result<Zeroizing<String>>;

    /// Tell the user why the previous attempt was rejected.
    fn notify(&mut self, message: &str);

    /// Whether asking again can produce a different answer.
    fn can_retry(&self) -> bool {
        true
    }
}

/// Obtain the encrypt key, enrolling a new passphrase when no verify key has
/// been recorded yet.
///
/// # Errors
///
/// Returns `LoomError::PassphraseMismatch` when a mismatch occurs and the
/// prompt cannot retry, or any error raised by the prompt or the store.
pub fn obtain_key(
    store: &VerifyKeyStore,
    prompt: &mut dyn PassphrasePrompt,
) -> Result<EncryptKey> {
    match store.load()? {
        Some(recorded) => verify_against(&recorded, prompt),
        None => enroll(store, prompt),
    }
}

/// Obtain the encrypt key for an existing repository.
///
/// # Errors
///
/// Returns `LoomError::MissingVerifyKey` when nothing has been recorded.
pub fn verify_only(
    store: &VerifyKeyStore,
    prompt: &mut dyn PassphrasePrompt,
) -> Result<EncryptKey> {
    let recorded = store
        .load()?
        .ok_or_else(|| LoomError::MissingVerifyKey(store.path().to_path_buf()))?;
    verify_against(&recorded, prompt)
}

fn verify_against(recorded: &VerifyKey, prompt: &mut dyn PassphrasePrompt) -> Result<EncryptKey> {
    loop {
        let passphrase = prompt.passphrase()?;
        let (encrypt_key, verify_key) = hash_passphrase(&passphrase);
        if &verify_key == recorded {
            debug!("passphrase matches recorded verify key");
            return Ok(encrypt_key);
        }
        reject(prompt, RECORD_MISMATCH_MESSAGE)?;
    }
}

fn enroll(store: &VerifyKeyStore, prompt: &mut dyn PassphrasePrompt) -> Result<EncryptKey> {
    loop {
        let passphrase = prompt.passphrase()?;
        let repeated = prompt.repeated_passphrase()?;
        if *passphrase != *repeated {
            reject(prompt, REPEAT_MISMATCH_MESSAGE)?;
            continue;
        }
        if passphrase.trim().is_empty() {
            reject(prompt, EMPTY_PASSPHRASE_MESSAGE)?;
            continue;
        }
        let (encrypt_key, verify_key) = hash_passphrase(&passphrase);
        store.save(&verify_key)?;
        info!(path = %store.path().display(), "recorded new verify key");
        return Ok(encrypt_key);
    }
}

fn reject(prompt: &mut dyn PassphrasePrompt, message: &str) -> Result<()> {
    if !prompt.can_retry() {
        return Err(LoomError::PassphraseMismatch);
    }
    prompt.notify(message);
    Ok(())
}
