use chrono::{Datelike, NaiveDate};

use crate::constants::{MAX_CONSUME_YEAR, MIN_CONSUME_YEAR};
use crate::store::StoreError;

const SEPARATOR: char = ':';

/// Date segment format. Zero-padded years keep lexicographic key order equal
/// to chronological order for years 1..=9999; other years are rejected.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn ensure_segment(kind: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() || value.contains(SEPARATOR) {
        return Err(StoreError::Validation(format!(
            "invalid {kind} for key: {value:?}"
        )));
    }
    Ok(())
}

fn ensure_date(date: NaiveDate) -> Result<(), StoreError> {
    if !(MIN_CONSUME_YEAR..=MAX_CONSUME_YEAR).contains(&date.year()) {
        return Err(StoreError::Validation(format!(
            "date {date} outside {MIN_CONSUME_YEAR}..={MAX_CONSUME_YEAR} for key"
        )));
    }
    Ok(())
}

/// `{user_id}:{YYYY-MM-DD}:{record_id}`
pub fn record_key(user_id: &str, date: NaiveDate, record_id: &str) -> Result<String, StoreError> {
    ensure_segment("user_id", user_id)?;
    ensure_segment("record_id", record_id)?;
    ensure_date(date)?;
    Ok(format!(
        "{}:{}:{}",
        user_id,
        date.format(DATE_FORMAT),
        record_id
    ))
}

pub fn record_prefix(user_id: &str) -> Result<String, StoreError> {
    ensure_segment("user_id", user_id)?;
    Ok(format!("{}:", user_id))
}

/// Half-open `[lower, upper)` key bounds covering every record of `user_id`
/// dated within `start..=end`. `;` sorts directly after `:`.
pub fn record_date_bounds(
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(String, String), StoreError> {
    ensure_segment("user_id", user_id)?;
    ensure_date(start)?;
    ensure_date(end)?;
    Ok((
        format!("{}:{}:", user_id, start.format(DATE_FORMAT)),
        format!("{}:{};", user_id, end.format(DATE_FORMAT)),
    ))
}

pub fn record_id_key(record_id: &str) -> Result<String, StoreError> {
    ensure_segment("record_id", record_id)?;
    Ok(record_id.to_string())
}

/// Reads the date segment back out of a primary key without deserializing the value.
pub fn date_from_record_key(key: &[u8]) -> Option<NaiveDate> {
    let text = std::str::from_utf8(key).ok()?;
    let mut parts = text.splitn(3, SEPARATOR);
    let _user = parts.next()?;
    let date = parts.next()?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}
