//! Capsule storage.
//!
//! - **traits**: the `CapsuleStore` interface used by the scheduler
//! - **sqlite**: SQLite catalog + one ciphertext file per capsule
//! - **types**: capsule data model
//! - **config**: explicit catalog/blob locations

pub mod config;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use config::StoreConfig;
pub use sqlite::SqliteCapsuleStore;
pub use traits::CapsuleStore;
pub use types::{
    Capsule, CapsuleStatus, CapsuleSummary, ContentType, IntegrityReport, NewCapsule,
};
