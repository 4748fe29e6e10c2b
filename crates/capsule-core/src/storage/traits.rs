//! Capsule store trait definition.
//!
//! The `CapsuleStore` trait is the seam between the unlock scheduler and
//! persistence. It couples a metadata catalog with a 1:1 ciphertext blob
//! store.

use chrono::{DateTime, Utc};

use super::types::{Capsule, CapsuleSummary, IntegrityReport, NewCapsule};
use crate::error::Result;

/// Durable catalog of capsule metadata plus one ciphertext blob per capsule.
///
/// All implementations must ensure:
/// - A capsule's blob is fully written before its row is visible
/// - `status` only moves from locked to unlocked
/// - `salt`, `nonce` and `unlock_time` never change after creation
pub trait CapsuleStore {
    /// Ensure the catalog schema and blob directory exist.
    ///
    /// Idempotent; safe to call on every process start.
    fn initialize(&mut self) -> Result<()>;

    /// Seal a new capsule: write its blob, then commit its metadata row.
    ///
    /// # Returns
    ///
    /// Returns the id assigned to the capsule.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::EmptyTitle` for a blank title,
    /// `CapsuleError::InvalidSalt` / `InvalidNonceLength` for malformed key
    /// material, and a storage error if the blob or row cannot be written.
    fn create(&mut self, capsule: &NewCapsule) -> Result<i64>;

    /// Capsules with `status == locked` and `unlock_time <= as_of`, in insertion order.
    fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Capsule>>;

    /// Read the ciphertext blob for `ciphertext_ref`.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::BlobMissing` if the file is absent.
    fn read_ciphertext(&self, ciphertext_ref: &str) -> Result<Vec<u8>>;

    /// Transition capsule `id` to unlocked. Calling it again is a no-op.
    fn mark_unlocked(&mut self, id: i64) -> Result<()>;

    /// All capsules for inspection, in insertion order.
    fn list_all(&self) -> Result<Vec<CapsuleSummary>>;

    /// Get a capsule by id.
    fn get(&self, id: i64) -> Result<Option<Capsule>>;

    /// Check catalog consistency and blob presence.
    fn check_integrity(&self) -> Result<IntegrityReport>;
}
