//! Cryptographic operations for capsules.
//!
//! - **PBKDF2-HMAC-SHA256**: password + salt to a 256-bit key
//! - **AES-256-GCM**: authenticated encryption of the capsule payload
//!
//! ## Security Model
//!
//! - Every capsule has its own random salt and nonce
//! - Derived keys are zeroized from memory on drop
//! - Passwords are never stored; a wrong password is detected by tag
//!   verification failure
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Swapping blob files between capsules (no associated data is bound)

pub mod cipher;
pub mod key;

pub use cipher::{decrypt, encrypt, CapsuleNonce, NONCE_LENGTH};
pub use key::{
    derive_key, derive_key_default, generate_salt, DerivedKey, DEFAULT_ITERATIONS,
    MIN_SALT_LENGTH, SALT_LENGTH,
};
