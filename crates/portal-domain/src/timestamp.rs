//! Lenient timestamp parsing for stored and imported rows.
//!
//! Rows written by older pages carry RFC 3339 strings, zone-less local
//! strings (`2023-01-10T10:30:00`), bare dates, or epoch milliseconds.
//! All of them load as UTC instants; values are always written back as
//! RFC 3339.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

/// Parse a timestamp string in any of the accepted shapes.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Whether a timestamp still holds the deserialization default (the epoch).
pub fn is_unset(at: &DateTime<Utc>) -> bool {
    at.timestamp_millis() == 0
}

/// Epoch milliseconds to a UTC instant.
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// `deserialize_with` target for timestamp fields.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(millis) => from_millis(millis)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}", millis))),
        RawTimestamp::Text(text) => parse_timestamp(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", text))),
    }
}
