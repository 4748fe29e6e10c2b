//! Capsule row type for catalog queries.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{CapsuleError, Result};
use crate::storage::types::{Capsule, CapsuleSummary};

/// Column list matching [`CapsuleRow::from_sql_row`].
pub(super) const CAPSULE_COLUMNS: &str =
    "id, title, content_type, unlock_time, status, salt, nonce, file_name, created_at, unlocked_at";

/// Format an instant for storage.
///
/// Fixed-width UTC with microseconds, so string order in SQL matches time order.
pub(super) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| CapsuleError::Storage(format!("Invalid {} timestamp: {}", column, e)))
}

/// Raw row data from the capsules table, before parsing into domain types.
#[derive(Debug)]
pub(super) struct CapsuleRow {
    pub id: i64,
    pub title: String,
    pub content_type: String,
    pub unlock_time: String,
    pub status: String,
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub file_name: String,
    pub created_at: String,
    pub unlocked_at: Option<String>,
}

impl CapsuleRow {
    pub fn from_sql_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content_type: row.get(2)?,
            unlock_time: row.get(3)?,
            status: row.get(4)?,
            salt: row.get(5)?,
            nonce: row.get(6)?,
            file_name: row.get(7)?,
            created_at: row.get(8)?,
            unlocked_at: row.get(9)?,
        })
    }
}

impl TryFrom<CapsuleRow> for Capsule {
    type Error = CapsuleError;

    fn try_from(row: CapsuleRow) -> Result<Self> {
        let content_type = row
            .content_type
            .parse()
            .map_err(|_| CapsuleError::Storage(format!("Invalid content type: {}", row.content_type)))?;
        let unlocked_at = row
            .unlocked_at
            .as_deref()
            .map(|value| parse_timestamp(value, "unlocked_at"))
            .transpose()?;

        Ok(Capsule {
            id: row.id,
            title: row.title,
            content_type,
            unlock_time: parse_timestamp(&row.unlock_time, "unlock_time")?,
            status: row.status.parse()?,
            salt: row.salt,
            nonce: row.nonce,
            ciphertext_ref: row.file_name,
            created_at: parse_timestamp(&row.created_at, "created_at")?,
            unlocked_at,
        })
    }
}

impl From<&Capsule> for CapsuleSummary {
    fn from(capsule: &Capsule) -> Self {
        CapsuleSummary {
            id: capsule.id,
            title: capsule.title.clone(),
            content_type: capsule.content_type,
            unlock_time: capsule.unlock_time,
            status: capsule.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_timestamp_format_is_fixed_width_and_sortable() {
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let late = early + Duration::microseconds(1);

        let a = format_timestamp(early);
        let b = format_timestamp(late);

        assert_eq!(a, "2025-01-01T00:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn test_row_with_bad_status_rejected() {
        let row = CapsuleRow {
            id: 1,
            title: "note".to_string(),
            content_type: "text".to_string(),
            unlock_time: "2025-01-01T00:00:00.000000Z".to_string(),
            status: "opened".to_string(),
            salt: vec![0; 16],
            nonce: vec![0; 12],
            file_name: "a.tccap".to_string(),
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            unlocked_at: None,
        };

        let result: Result<Capsule> = row.try_into();
        assert!(matches!(result, Err(CapsuleError::Storage(_))));
    }
}
