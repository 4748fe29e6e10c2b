//! AES-256-GCM encryption/decryption utilities.
//!
//! Each call to [`encrypt`] draws a fresh 96-bit nonce from the OS RNG.
//! The returned ciphertext carries the 16-byte authentication tag appended
//! by `aes-gcm`; that combined value is what gets written to a capsule's
//! blob file. No associated data is bound into the tag.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};

use crate::error::{CapsuleError, Result};

use super::key::KEY_LENGTH;

/// Nonce length in bytes (96 bits).
pub const NONCE_LENGTH: usize = 12;

/// Length of the GCM authentication tag appended to each ciphertext.
pub const TAG_LENGTH: usize = 16;

/// Nonce used for a single capsule payload.
pub type CapsuleNonce = [u8; NONCE_LENGTH];

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm> {
    if key.len() != KEY_LENGTH {
        return Err(CapsuleError::InvalidKeyLength { len: key.len() });
    }
    Aes256Gcm::new_from_slice(key)
        .map_err(|e| CapsuleError::Crypto(format!("Failed to initialize cipher: {}", e)))
}

/// Encrypt a payload under a 32-byte key.
///
/// # Returns
///
/// Returns `(nonce, ciphertext)`; the ciphertext includes the tag.
///
/// # Errors
///
/// Returns `CapsuleError::InvalidKeyLength` if the key is not 32 bytes.
///
/// # Examples
///
/// ```
/// use capsule_core::crypto::{decrypt, encrypt};
///
/// let key = [7u8; 32];
/// let (nonce, ciphertext) = encrypt(b"see you in 2030", &key).unwrap();
/// assert_eq!(decrypt(&nonce, &ciphertext, &key).unwrap(), b"see you in 2030");
/// ```
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<(CapsuleNonce, Vec<u8>)> {
    let cipher = cipher_for(key)?;

    let mut nonce = [0u8; NONCE_LENGTH];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| CapsuleError::Crypto(format!("Failed to generate nonce: {}", e)))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CapsuleError::Crypto(format!("Encryption failed: {}", e)))?;

    Ok((nonce, ciphertext))
}

/// Decrypt a payload sealed by [`encrypt`].
///
/// # Errors
///
/// Returns `CapsuleError::AuthenticationFailure` if the tag does not verify
/// under `(nonce, key)`. A key derived from the wrong password lands here.
pub fn decrypt(nonce: &[u8], ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;
    if nonce.len() != NONCE_LENGTH {
        return Err(CapsuleError::InvalidNonceLength { len: nonce.len() });
    }

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CapsuleError::AuthenticationFailure)
}
