use chrono::{DateTime, NaiveDate, Utc};

/// Parse an ISO-8601 timestamp into epoch milliseconds.
///
/// Accepts full RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as
/// midnight UTC). Returns `None` for missing, empty, or unparsable input:
/// absence and garbage are deliberately indistinguishable, so freshness
/// decisions degrade toward "not newer" instead of failing.
#[must_use]
pub fn parse_timestamp(value: Option<&str>) -> Option<i64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
}

/// Current instant as an RFC 3339 UTC string, for `updatedAt` stamps.
#[must_use]
pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}
