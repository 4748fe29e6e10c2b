//! SQLite capsule catalog with one ciphertext file per capsule.
//!
//! Metadata rows live in a `capsules` table. Each capsule's ciphertext is
//! written atomically to `<blob_dir>/<uuid>.tccap` before its row is
//! inserted, so no committed row ever points at a blob that was not fully
//! written.

mod row;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::crypto::{MIN_SALT_LENGTH, NONCE_LENGTH};
use crate::error::{CapsuleError, Result};
use crate::storage::config::StoreConfig;
use crate::storage::traits::CapsuleStore;
use crate::storage::types::{Capsule, CapsuleSummary, IntegrityReport, NewCapsule};
use crate::time::ensure_storable;

use row::{format_timestamp, CapsuleRow, CAPSULE_COLUMNS};

/// Catalog schema version recorded in the `meta` table.
const SCHEMA_VERSION: &str = "1";

/// Extension for capsule blob files.
const BLOB_EXTENSION: &str = "tccap";

/// SQLite-backed capsule store.
pub struct SqliteCapsuleStore {
    config: StoreConfig,
    conn: Mutex<Connection>,
}

impl SqliteCapsuleStore {
    /// Open (creating if needed) the store described by `config` and initialize it.
    pub fn open(config: StoreConfig) -> Result<Self> {
        if let Some(parent) = config.catalog_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CapsuleError::Storage(format!(
                        "Failed to create catalog directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(&config.catalog_path)?;
        let mut store = Self {
            config,
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Absolute path of the blob behind `ciphertext_ref`.
    pub fn blob_path(&self, ciphertext_ref: &str) -> Result<PathBuf> {
        validate_blob_ref(ciphertext_ref)?;
        Ok(self.config.blob_dir.join(ciphertext_ref))
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CapsuleError::Storage("SQLite connection poisoned".to_string()))
    }

    fn query_capsules(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Capsule>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, CapsuleRow::from_sql_row)?;

        let mut capsules = Vec::new();
        for row in rows {
            capsules.push(row?.try_into()?);
        }
        Ok(capsules)
    }
}

/// Blob refs are bare file names inside the blob directory.
fn validate_blob_ref(ciphertext_ref: &str) -> Result<()> {
    let is_plain_name = !ciphertext_ref.is_empty()
        && ciphertext_ref != "."
        && ciphertext_ref != ".."
        && !ciphertext_ref.contains(['/', '\\'])
        && Path::new(ciphertext_ref).file_name() == Some(OsStr::new(ciphertext_ref));
    if is_plain_name {
        Ok(())
    } else {
        Err(CapsuleError::Validation(format!(
            "Invalid ciphertext reference: {:?}",
            ciphertext_ref
        )))
    }
}

fn validate_new_capsule(capsule: &NewCapsule) -> Result<()> {
    if capsule.title.trim().is_empty() {
        return Err(CapsuleError::EmptyTitle);
    }
    if capsule.salt.len() < MIN_SALT_LENGTH {
        return Err(CapsuleError::InvalidSalt {
            len: capsule.salt.len(),
        });
    }
    if capsule.nonce.len() != NONCE_LENGTH {
        return Err(CapsuleError::InvalidNonceLength {
            len: capsule.nonce.len(),
        });
    }
    ensure_storable(capsule.unlock_time)?;
    Ok(())
}

impl CapsuleStore for SqliteCapsuleStore {
    fn initialize(&mut self) -> Result<()> {
        fs::create_dir_all(&self.config.blob_dir).map_err(|e| {
            CapsuleError::Storage(format!(
                "Failed to create blob directory {}: {}",
                self.config.blob_dir.display(),
                e
            ))
        })?;

        let conn = self.lock_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS capsules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content_type TEXT NOT NULL CHECK (content_type IN ('text', 'photo', 'video')),
                unlock_time TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('locked', 'unlocked')),
                salt BLOB NOT NULL,
                nonce BLOB NOT NULL,
                file_name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                unlocked_at TEXT
            );

            CREATE INDEX IF NOT EXISTS capsules_due
                ON capsules (status, unlock_time);
            "#,
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?)",
            [SCHEMA_VERSION],
        )?;

        Ok(())
    }

    fn create(&mut self, capsule: &NewCapsule) -> Result<i64> {
        validate_new_capsule(capsule)?;

        let file_name = format!("{}.{}", Uuid::new_v4(), BLOB_EXTENSION);
        let blob_path = self.config.blob_dir.join(&file_name);
        crate::fs::write_new_atomic(&blob_path, &capsule.ciphertext).map_err(|e| {
            CapsuleError::Storage(format!(
                "Failed to write ciphertext {}: {}",
                blob_path.display(),
                e
            ))
        })?;

        let inserted = (|| -> Result<i64> {
            let mut conn = self.lock_conn()?;
            let tx = conn.transaction()?;
            tx.execute(
                r#"
                INSERT INTO capsules (
                    title,
                    content_type,
                    unlock_time,
                    status,
                    salt,
                    nonce,
                    file_name,
                    created_at
                )
                VALUES (?, ?, ?, 'locked', ?, ?, ?, ?)
                "#,
                (
                    capsule.title.as_str(),
                    capsule.content_type.as_str(),
                    format_timestamp(capsule.unlock_time),
                    capsule.salt.as_slice(),
                    capsule.nonce.as_slice(),
                    file_name.as_str(),
                    format_timestamp(Utc::now()),
                ),
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(id)
        })();

        match inserted {
            Ok(id) => {
                debug!(capsule_id = id, file = %file_name, "capsule sealed");
                Ok(id)
            }
            Err(err) => {
                let _ = fs::remove_file(&blob_path);
                Err(err)
            }
        }
    }

    fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Capsule>> {
        let sql = format!(
            "SELECT {} FROM capsules WHERE status = 'locked' AND unlock_time <= ? ORDER BY id",
            CAPSULE_COLUMNS
        );
        self.query_capsules(&sql, [format_timestamp(as_of)])
    }

    fn read_ciphertext(&self, ciphertext_ref: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(ciphertext_ref)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(CapsuleError::BlobMissing(path))
            }
            Err(err) => Err(CapsuleError::Storage(format!(
                "Failed to read ciphertext {}: {}",
                path.display(),
                err
            ))),
        }
    }

    fn mark_unlocked(&mut self, id: i64) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE capsules SET status = 'unlocked', unlocked_at = ? WHERE id = ? AND status = 'locked'",
            (format_timestamp(Utc::now()), id),
        )?;
        if changed == 0 {
            let exists: Option<i64> = tx
                .query_row("SELECT id FROM capsules WHERE id = ?", [id], |row| {
                    row.get(0)
                })
                .optional()?;
            if exists.is_none() {
                return Err(CapsuleError::NotFound(format!("Capsule {}", id)));
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<CapsuleSummary>> {
        let sql = format!("SELECT {} FROM capsules ORDER BY id", CAPSULE_COLUMNS);
        let capsules = self.query_capsules(&sql, params![])?;
        Ok(capsules.iter().map(CapsuleSummary::from).collect())
    }

    fn get(&self, id: i64) -> Result<Option<Capsule>> {
        let sql = format!("SELECT {} FROM capsules WHERE id = ?", CAPSULE_COLUMNS);
        Ok(self.query_capsules(&sql, [id])?.into_iter().next())
    }

    fn check_integrity(&self) -> Result<IntegrityReport> {
        let mut report = IntegrityReport::default();

        {
            let conn = self.lock_conn()?;
            let mut stmt = conn.prepare("PRAGMA integrity_check")?;
            let messages = stmt.query_map(params![], |row| row.get::<_, String>(0))?;
            for message in messages {
                let message = message?;
                if message != "ok" {
                    report.sqlite_problems.push(message);
                }
            }
        }

        let sql = format!("SELECT {} FROM capsules ORDER BY id", CAPSULE_COLUMNS);
        for capsule in self.query_capsules(&sql, params![])? {
            let path = self.blob_path(&capsule.ciphertext_ref)?;
            if !path.is_file() {
                report
                    .missing_blobs
                    .push((capsule.id, path.to_string_lossy().to_string()));
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_ref_validation() {
        assert!(validate_blob_ref("0b9c.tccap").is_ok());
        assert!(validate_blob_ref("").is_err());
        assert!(validate_blob_ref("..").is_err());
        assert!(validate_blob_ref("../x.tccap").is_err());
        assert!(validate_blob_ref("a/b.tccap").is_err());
        assert!(validate_blob_ref("a\\b.tccap").is_err());
    }
}
