//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Turns a capsule password and its stored salt into the 32-byte key used
//! by the AES-256-GCM cipher. The iteration count makes offline
//! brute-forcing of the password expensive.

use sha2::Sha256;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::error::{CapsuleError, Result};

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 390_000;

/// Minimum accepted salt length in bytes.
pub const MIN_SALT_LENGTH: usize = 8;

/// Salt length used when sealing new capsules.
pub const SALT_LENGTH: usize = 16;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256).
pub const KEY_LENGTH: usize = 32;

/// A cryptographic key derived from a password.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a capsule key from a password and salt.
///
/// # Arguments
///
/// * `password` - The capsule password
/// * `salt` - Random salt stored with the capsule (at least 8 bytes)
/// * `iterations` - PBKDF2 work factor, normally [`DEFAULT_ITERATIONS`]
///
/// # Errors
///
/// Returns `CapsuleError::InvalidSalt` if the salt is shorter than 8 bytes
/// and `CapsuleError::Validation` if `iterations` is zero.
///
/// # Examples
///
/// ```
/// use capsule_core::crypto::derive_key;
///
/// let key = derive_key("correct horse", b"sixteen-byte-slt", 1_000).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Result<DerivedKey> {
    if salt.len() < MIN_SALT_LENGTH {
        return Err(CapsuleError::InvalidSalt { len: salt.len() });
    }
    if iterations == 0 {
        return Err(CapsuleError::Validation(
            "KDF iteration count must be positive".to_string(),
        ));
    }

    let mut key_bytes = Zeroizing::new([0u8; KEY_LENGTH]);
    pbkdf2::pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt,
        iterations,
        key_bytes.as_mut_slice(),
    );

    Ok(DerivedKey::from_bytes(*key_bytes))
}

/// Derive a capsule key with the default iteration count.
pub fn derive_key_default(password: &str, salt: &[u8]) -> Result<DerivedKey> {
    derive_key(password, salt, DEFAULT_ITERATIONS)
}

/// Generate a fresh random salt for a new capsule.
pub fn generate_salt() -> Result<[u8; SALT_LENGTH]> {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt)
        .map_err(|e| CapsuleError::Crypto(format!("Failed to generate salt: {}", e)))?;
    Ok(salt)
}
