//! Time and identifier helpers
//!
//! All persisted timestamps are RFC 3339 strings in UTC with millisecond
//! precision and a `Z` suffix, e.g. `2025-03-14T09:26:53.589Z`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::{AppError, AppResult};
use crate::types::{Id, IsoTimestamp};

/// Format an instant the way every document timestamp is stored
pub fn format_timestamp(at: DateTime<Utc>) -> IsoTimestamp {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current UTC time as a document timestamp
pub fn now_iso() -> IsoTimestamp {
    format_timestamp(Utc::now())
}

/// Parse a stored timestamp; `None` if it is not RFC 3339
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Generate a universally-unique opaque identifier (UUID v4)
pub fn new_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

/// Convert a `YYYY-MM-DD` date input into a full timestamp (midnight UTC)
///
/// Blank input means "no due date".
pub fn date_input_to_timestamp(date: &str) -> AppResult<Option<IsoTimestamp>> {
    let date = date.trim();
    if date.is_empty() {
        return Ok(None);
    }
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        AppError::invalid_format(format!("Invalid date format: {}", date))
            .with_detail("field", "dueDate")
    })?;
    let midnight = parsed.and_hms_opt(0, 0, 0).ok_or_else(|| {
        AppError::invalid_format(format!("Invalid date: {}", date)).with_detail("field", "dueDate")
    })?;
    Ok(Some(format_timestamp(midnight.and_utc())))
}
