//! Error types for capsule core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for capsule operations.
pub type Result<T> = std::result::Result<T, CapsuleError>;

/// Core error type for capsule operations.
#[derive(Debug, Error)]
pub enum CapsuleError {
    /// Capsule title is empty or whitespace
    #[error("Capsule title cannot be empty")]
    EmptyTitle,

    /// Unlock time matched neither the relative nor the absolute form
    #[error("Invalid unlock time: {0}")]
    InvalidUnlockTime(String),

    /// Salt too short for key derivation
    #[error("Invalid salt: expected at least 8 bytes, got {len}")]
    InvalidSalt { len: usize },

    /// Encryption key is not 32 bytes
    #[error("Invalid key length: expected 32 bytes, got {len}")]
    InvalidKeyLength { len: usize },

    /// Nonce is not 12 bytes
    #[error("Invalid nonce length: expected 12 bytes, got {len}")]
    InvalidNonceLength { len: usize },

    /// Authentication tag did not verify (wrong password or corrupted ciphertext)
    #[error("Authentication failed: wrong password or corrupted ciphertext")]
    AuthenticationFailure,

    /// Ciphertext blob referenced by a capsule is absent
    #[error("Ciphertext file missing: {}", .0.display())]
    BlobMissing(PathBuf),

    /// Password source could not supply a password
    #[error("Password unavailable: {0}")]
    PasswordUnavailable(String),

    /// Display collaborator failed to render content
    #[error("Display error: {0}")]
    Display(String),

    /// Generic cryptographic failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl CapsuleError {
    /// Whether this error was caused by caller input rather than storage or crypto state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CapsuleError::EmptyTitle
                | CapsuleError::InvalidUnlockTime(_)
                | CapsuleError::InvalidSalt { .. }
                | CapsuleError::InvalidKeyLength { .. }
                | CapsuleError::InvalidNonceLength { .. }
                | CapsuleError::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(CapsuleError::EmptyTitle.is_validation());
        assert!(CapsuleError::InvalidSalt { len: 4 }.is_validation());
        assert!(CapsuleError::InvalidUnlockTime("xyz".to_string()).is_validation());
        assert!(!CapsuleError::AuthenticationFailure.is_validation());
        assert!(!CapsuleError::BlobMissing(PathBuf::from("a.tccap")).is_validation());
    }

    #[test]
    fn test_blob_missing_message_names_path() {
        let err = CapsuleError::BlobMissing(PathBuf::from("/tmp/x.tccap"));
        assert!(err.to_string().contains("/tmp/x.tccap"));
    }
}
