//! Core data types for the capsule store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::CapsuleNonce;
use crate::error::CapsuleError;

/// How the display collaborator renders a capsule's plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Photo,
    Video,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = CapsuleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "photo" => Ok(Self::Photo),
            "video" => Ok(Self::Video),
            other => Err(CapsuleError::Validation(format!(
                "Unknown content type: {} (use text/photo/video)",
                other
            ))),
        }
    }
}

/// Lock state of a capsule. Only ever moves from `Locked` to `Unlocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapsuleStatus {
    Locked,
    Unlocked,
}

impl CapsuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
        }
    }
}

impl fmt::Display for CapsuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapsuleStatus {
    type Err = CapsuleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "locked" => Ok(Self::Locked),
            "unlocked" => Ok(Self::Unlocked),
            other => Err(CapsuleError::Storage(format!(
                "Unknown capsule status: {}",
                other
            ))),
        }
    }
}

/// A sealed capsule as stored in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capsule {
    /// Store-assigned identifier
    pub id: i64,

    /// User-facing title
    pub title: String,

    pub content_type: ContentType,

    /// Instant after which unlock attempts are permitted
    pub unlock_time: DateTime<Utc>,

    pub status: CapsuleStatus,

    /// KDF salt (immutable)
    pub salt: Vec<u8>,

    /// AES-GCM nonce (immutable)
    pub nonce: Vec<u8>,

    /// Blob file name inside the store's blob directory
    pub ciphertext_ref: String,

    /// When this capsule was sealed
    pub created_at: DateTime<Utc>,

    /// When this capsule was unlocked, if it has been
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Capsule {
    /// Whether the capsule may be unlocked at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == CapsuleStatus::Locked && self.unlock_time <= now
    }
}

/// Inspection view of a capsule, without key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsuleSummary {
    pub id: i64,
    pub title: String,
    pub content_type: ContentType,
    pub unlock_time: DateTime<Utc>,
    pub status: CapsuleStatus,
}

/// Builder for sealing a new capsule into the store.
#[derive(Debug, Clone)]
pub struct NewCapsule {
    pub title: String,
    pub unlock_time: DateTime<Utc>,
    pub content_type: ContentType,
    pub ciphertext: Vec<u8>,
    pub nonce: CapsuleNonce,
    pub salt: Vec<u8>,
}

impl NewCapsule {
    pub fn new(
        title: impl Into<String>,
        unlock_time: DateTime<Utc>,
        content_type: ContentType,
        ciphertext: Vec<u8>,
        nonce: CapsuleNonce,
        salt: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            title: title.into(),
            unlock_time,
            content_type,
            ciphertext,
            nonce,
            salt: salt.into(),
        }
    }
}

/// Result of a store integrity check.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    /// Messages reported by `PRAGMA integrity_check` other than "ok"
    pub sqlite_problems: Vec<String>,

    /// Capsules (id, blob path) whose ciphertext file is missing
    pub missing_blobs: Vec<(i64, String)>,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.sqlite_problems.is_empty() && self.missing_blobs.is_empty()
    }
}
