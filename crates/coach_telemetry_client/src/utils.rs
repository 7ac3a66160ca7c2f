//! Utility functions for timestamp normalization.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a session completion timestamp into UTC.
///
/// Accepts:
/// - RFC3339 datetime (any offset) -> converted to UTC
/// - Naive datetime YYYY-MM-DDTHH:MM:SS (or with fractional seconds) -> read as UTC
/// - YYYY-MM-DD -> midnight UTC
pub fn parse_completed_at(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    None
}
