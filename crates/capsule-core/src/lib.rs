//! # Capsule Core
//!
//! Core library for Time Capsule: seal content under a password so that it
//! cannot be opened before a chosen time, and unlock it once it is due.
//!
//! This crate provides the domain logic, storage and scheduling
//! independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **crypto**: PBKDF2 key derivation and AES-256-GCM encryption
//! - **time**: unlock-time parsing (`2h`, `3d`, ISO-8601)
//! - **storage**: SQLite catalog + one ciphertext file per capsule
//! - **seal**: creation flow tying the above together
//! - **scheduler**: polling unlock of due capsules
//! - **secure_temp**: wiped temp files for decrypted media

pub mod crypto;
pub mod error;
pub mod fs;
pub mod scheduler;
pub mod seal;
pub mod secure_temp;
pub mod storage;
pub mod time;

pub use error::{CapsuleError, Result};
pub use scheduler::{ContentDisplay, PasswordSource, Scheduler, Shutdown, UnlockReport};
pub use seal::{seal, SealRequest};
pub use storage::{CapsuleStore, SqliteCapsuleStore, StoreConfig};
pub use time::parse_unlock_time;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
