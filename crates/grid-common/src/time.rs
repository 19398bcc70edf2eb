//! Timestamp parsing for attribute tables.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::{GridCommonError, Result};

/// Naive formats tried after RFC 3339, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp string.
///
/// Accepts RFC 3339 (`2025-04-18T08:00:00+00:00`), the space-separated form
/// written by dataframe libraries (`2025-04-18 08:00:00+00:00`), and naive
/// forms such as `2025-04-18T08:00`, which are taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(GridCommonError::InvalidTimestamp(s.to_string()))
}

/// Parse a timestamp property value: a string, or epoch milliseconds.
pub fn timestamp_from_value(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| GridCommonError::InvalidTimestamp(n.to_string())),
        other => Err(GridCommonError::InvalidTimestamp(other.to_string())),
    }
}

/// Format a timestamp the way output tables store it.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 18, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_variants() {
        for s in [
            "2025-04-18T08:00:00Z",
            "2025-04-18T08:00:00+00:00",
            "2025-04-18 08:00:00+00:00",
            "2025-04-18T08:00",
            "2025-04-18 08:00:00",
        ] {
            assert_eq!(parse_timestamp(s).unwrap(), expected(), "format {}", s);
        }
    }

    #[test]
    fn test_offset_is_normalized() {
        let ts = parse_timestamp("2025-04-18T03:00:00-05:00").unwrap();
        assert_eq!(ts, expected());
    }

    #[test]
    fn test_epoch_millis() {
        let value = serde_json::json!(expected().timestamp_millis());
        assert_eq!(timestamp_from_value(&value).unwrap(), expected());
    }

    #[test]
    fn test_invalid() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(timestamp_from_value(&serde_json::json!(true)).is_err());
    }
}
