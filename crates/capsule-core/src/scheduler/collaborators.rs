//! Interfaces the scheduler calls out to.
//!
//! The scheduler never prompts or renders on its own. A front end supplies
//! a [`PasswordSource`] (interactive prompt, environment, fixed value) and a
//! [`ContentDisplay`] (console, media viewer, test recorder).

use secrecy::SecretString;

use crate::error::Result;
use crate::storage::{Capsule, ContentType};

/// Supplies the password for a due capsule.
pub trait PasswordSource {
    /// Return the password to try for `capsule`.
    ///
    /// An error means "skip this capsule for now"; it stays locked.
    fn password_for(&mut self, capsule: &Capsule) -> Result<SecretString>;
}

/// Renders decrypted capsule content.
pub trait ContentDisplay {
    /// Show `plaintext` according to `content_type`.
    ///
    /// Returning an error keeps the capsule locked for a later retry.
    fn show(&mut self, content_type: ContentType, plaintext: &[u8], title: &str) -> Result<()>;
}

/// A pre-supplied password used for every capsule.
pub struct FixedPassword {
    password: SecretString,
}

impl FixedPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: SecretString::from(password.into()),
        }
    }
}

impl PasswordSource for FixedPassword {
    fn password_for(&mut self, _capsule: &Capsule) -> Result<SecretString> {
        use secrecy::ExposeSecret;
        Ok(SecretString::from(self.password.expose_secret().to_string()))
    }
}

impl<F> PasswordSource for F
where
    F: FnMut(&Capsule) -> Result<SecretString>,
{
    fn password_for(&mut self, capsule: &Capsule) -> Result<SecretString> {
        self(capsule)
    }
}
