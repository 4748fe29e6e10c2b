//! Creation flow: encrypt plaintext under a password and store it as a capsule.

use chrono::{DateTime, Utc};

use crate::crypto::{derive_key, encrypt, generate_salt};
use crate::error::{CapsuleError, Result};
use crate::storage::{CapsuleStore, ContentType, NewCapsule};

/// Everything needed to seal one capsule.
pub struct SealRequest<'a> {
    pub title: &'a str,
    pub unlock_time: DateTime<Utc>,
    pub content_type: ContentType,
    pub plaintext: &'a [u8],
    pub password: &'a str,
}

/// Seal `request` into `store` and return the new capsule id.
///
/// A fresh 16-byte salt and 12-byte nonce are generated for every capsule.
///
/// # Errors
///
/// Returns `CapsuleError::EmptyTitle` for a blank title and
/// `CapsuleError::Validation` for an empty password; nothing is written
/// in either case.
pub fn seal<S: CapsuleStore + ?Sized>(
    store: &mut S,
    request: &SealRequest<'_>,
    kdf_iterations: u32,
) -> Result<i64> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(CapsuleError::EmptyTitle);
    }
    if request.password.is_empty() {
        return Err(CapsuleError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }

    let salt = generate_salt()?;
    let key = derive_key(request.password, &salt, kdf_iterations)?;
    let (nonce, ciphertext) = encrypt(request.plaintext, key.as_bytes())?;
    drop(key);

    let capsule = NewCapsule::new(
        title,
        request.unlock_time,
        request.content_type,
        ciphertext,
        nonce,
        salt,
    );
    store.create(&capsule)
}
