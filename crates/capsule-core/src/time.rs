//! Unlock-time parsing.
//!
//! Accepts either a relative offset (`90s`, `10m`, `2h`, `3d`, `1w`) or an
//! ISO-8601 style absolute date/time. Relative input always wins when it
//! matches; only inputs that are not `<digits><unit>` are tried as absolute.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::{CapsuleError, Result};

/// Naive date-time layouts tried after RFC 3339, in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Latest calendar year an unlock time may fall in.
///
/// Catalog timestamps are four-digit-year RFC 3339 strings; later years
/// would change the width and break both parsing and string ordering.
pub const MAX_UNLOCK_YEAR: i32 = 9999;

/// Reject instants outside years `0..=MAX_UNLOCK_YEAR`.
///
/// # Errors
///
/// Returns `CapsuleError::InvalidUnlockTime` for an out-of-range instant.
pub fn ensure_storable(value: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if (0..=MAX_UNLOCK_YEAR).contains(&value.year()) {
        Ok(value)
    } else {
        Err(CapsuleError::InvalidUnlockTime(format!(
            "{} is outside years 0000-{}",
            value, MAX_UNLOCK_YEAR
        )))
    }
}

/// Parse an unlock time relative to the current instant.
pub fn parse_unlock_time(input: &str) -> Result<DateTime<Utc>> {
    parse_unlock_time_at(input, Utc::now())
}

/// Parse an unlock time relative to `now`.
///
/// Naive absolute forms carry no zone and are taken as UTC, i.e. the
/// instant exactly as written.
///
/// # Errors
///
/// Returns `CapsuleError::InvalidUnlockTime` if the input matches neither form.
pub fn parse_unlock_time_at(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let value = input.trim();

    if let Some((amount, unit)) = split_relative(value) {
        return relative_instant(value, amount, unit, now);
    }

    let parsed = parse_absolute(value).ok_or_else(|| {
        CapsuleError::InvalidUnlockTime(format!(
            "{:?} (expected <number><s|m|h|d|w> or an ISO-8601 date/time)",
            input
        ))
    })?;
    ensure_storable(parsed)
}

/// Split `<digits><unit>` into its parts, or `None` if the shape does not match.
fn split_relative(value: &str) -> Option<(&str, char)> {
    let unit = value.chars().last()?;
    let digits = &value[..value.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match unit.to_ascii_lowercase() {
        's' | 'm' | 'h' | 'd' | 'w' => Some((digits, unit.to_ascii_lowercase())),
        _ => None,
    }
}

fn relative_instant(
    original: &str,
    amount: &str,
    unit: char,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let overflow = || CapsuleError::InvalidUnlockTime(format!("{:?} is too far away", original));

    let amount: i64 = amount.parse().map_err(|_| overflow())?;
    let unit_seconds: i64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => 7 * 24 * 60 * 60,
    };
    let seconds = amount.checked_mul(unit_seconds).ok_or_else(overflow)?;
    let offset = Duration::try_seconds(seconds).ok_or_else(overflow)?;
    let instant = now.checked_add_signed(offset).ok_or_else(overflow)?;
    ensure_storable(instant).map_err(|_| overflow())
}

fn parse_absolute(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
