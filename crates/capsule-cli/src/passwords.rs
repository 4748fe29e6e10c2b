//! Password input: environment, stdin and interactive prompts.

use std::io::{self, BufRead};

use dialoguer::Password;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

use capsule_core::storage::Capsule;
use capsule_core::{CapsuleError, PasswordSource};

use crate::constants::PASSWORD_ENV;
use crate::errors::CliError;

/// Password from `TIMECAPSULE_PASSWORD`, if set and non-blank.
pub fn env_password() -> Option<SecretString> {
    match std::env::var(PASSWORD_ENV) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        Ok(mut value) => {
            value.zeroize();
            None
        }
        Err(_) => None,
    }
}

/// Read a password from the first line of `reader`, without the line ending.
pub fn read_password_line<R: BufRead>(mut reader: R) -> anyhow::Result<SecretString> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| anyhow::anyhow!("Failed to read password from stdin: {}", e))?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    line.zeroize();

    if password.is_empty() {
        return Err(CliError::invalid_input("No password provided on stdin").into());
    }
    Ok(SecretString::from(password))
}

/// Password for sealing: stdin, env var or a confirmed prompt.
pub fn new_capsule_password(from_stdin: bool, interactive: bool) -> anyhow::Result<SecretString> {
    if from_stdin {
        return read_password_line(io::stdin().lock());
    }
    if let Some(password) = env_password() {
        return Ok(password);
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No password provided and no TTY available. Set {} or use --password-stdin.",
            PASSWORD_ENV
        ))
        .into());
    }
    Password::new()
        .with_prompt("Capsule password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Per-capsule password source for unlocking.
///
/// A password from the environment is used for every capsule. Otherwise the
/// user is prompted per capsule when a terminal is available; an empty answer
/// skips that capsule.
pub struct PromptPassword {
    preset: Option<SecretString>,
    interactive: bool,
}

impl PromptPassword {
    pub fn new(interactive: bool) -> Self {
        Self {
            preset: env_password(),
            interactive,
        }
    }

    #[cfg(test)]
    fn with_preset(preset: Option<SecretString>, interactive: bool) -> Self {
        Self {
            preset,
            interactive,
        }
    }
}

impl PasswordSource for PromptPassword {
    fn password_for(&mut self, capsule: &Capsule) -> capsule_core::Result<SecretString> {
        if let Some(preset) = &self.preset {
            return Ok(SecretString::from(preset.expose_secret().to_string()));
        }
        if !self.interactive {
            return Err(CapsuleError::PasswordUnavailable(format!(
                "no terminal available and {} is not set",
                PASSWORD_ENV
            )));
        }

        let answer = Password::new()
            .with_prompt(format!(
                "Password for \"{}\" (#{}, empty to skip)",
                capsule.title, capsule.id
            ))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| CapsuleError::PasswordUnavailable(e.to_string()))?;

        if answer.is_empty() {
            return Err(CapsuleError::PasswordUnavailable(
                "skipped at prompt".to_string(),
            ));
        }
        Ok(SecretString::from(answer))
    }
}
