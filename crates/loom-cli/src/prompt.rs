//! Passphrase sources: the terminal, or LOOM_PASSPHRASE for scripted runs.

use std::io::IsTerminal;

use dialoguer::Password;
use zeroize::Zeroizing;

use loom_core::{LoomError, PassphrasePrompt};

use crate::constants::env_vars;

const PASSPHRASE_PROMPT: &str = "Type a passphrase to generate encryption key";
const REPEAT_PROMPT: &str = "Repeat the passphrase";

/// Interactive prompt on the controlling terminal.
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ask(prompt: &str) -> loom_core::Result<Zeroizing<String>> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| LoomError::Other(format!("Failed to read passphrase: {}", e)))
    }
}

impl PassphrasePrompt for TerminalPrompt {
    fn passphrase(&mut self) -> loom_core::Result<Zeroizing<String>> {
        Self::ask(PASSPHRASE_PROMPT)
    }

    fn repeated_passphrase(&mut self) -> loom_core::Result<Zeroizing<String>> {
        Self::ask(REPEAT_PROMPT)
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Fixed passphrase from the environment. Answers the repeat prompt with
/// the same value and cannot be asked again after a mismatch.
pub struct EnvPrompt {
    passphrase: Zeroizing<String>,
}

impl EnvPrompt {
    pub fn new(passphrase: String) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase),
        }
    }
}

impl PassphrasePrompt for EnvPrompt {
    fn passphrase(&mut self) -> loom_core::Result<Zeroizing<String>> {
        Ok(self.passphrase.clone())
    }

    fn repeated_passphrase(&mut self) -> loom_core::Result<Zeroizing<String>> {
        Ok(self.passphrase.clone())
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn can_retry(&self) -> bool {
        false
    }
}

/// Pick the passphrase source: LOOM_PASSPHRASE if set, otherwise the
/// terminal when stdin is one.
pub fn passphrase_prompt() -> anyhow::Result<Box<dyn PassphrasePrompt>> {
    if let Ok(value) = std::env::var(env_vars::PASSPHRASE) {
        if !value.trim().is_empty() {
            return Ok(Box::new(EnvPrompt::new(value)));
        }
    }
    if !std::io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set {}.",
            env_vars::PASSPHRASE
        ));
    }
    Ok(Box::new(TerminalPrompt))
}
