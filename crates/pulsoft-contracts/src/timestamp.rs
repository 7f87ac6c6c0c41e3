//! Lenient timestamp decoding.
//!
//! Backends and older clients stamp records in three shapes:
//!
//! - RFC 3339 with an offset: `2024-01-15T14:30:00Z`
//! - ISO 8601 without an offset: `2024-01-15T14:30:00.123456`, read as UTC
//! - epoch milliseconds: `1705329000000`
//!
//! Use with `#[serde(deserialize_with = "crate::timestamp::deserialize")]`,
//! or [`option::deserialize`] for optional fields. Serialization is left to
//! chrono, which always writes RFC 3339.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a textual timestamp in either RFC 3339 or offset-less ISO form.
pub fn parse_str(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a JSON timestamp: a string per [`parse_str`], or integral epoch
/// milliseconds.
pub fn from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    from_value(&value).ok_or_else(|| D::Error::custom(format!("unrecognized timestamp {}", value)))
}

pub mod option {
    use super::*;

    /// `null` and a missing field both decode as `None`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => from_value(&value).map(Some).ok_or_else(|| {
                D::Error::custom(format!("unrecognized timestamp {}", value))
            }),
        }
    }
}
