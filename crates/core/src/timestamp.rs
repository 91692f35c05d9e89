//! Timestamp parsing for service payloads.
//!
//! The service serializes datetimes either as RFC 3339 or as naive
//! `YYYY-MM-DD HH:MM:SS[.ffffff]` strings (UTC without an offset). Both
//! are normalized to [`Timestamp`] so records of either kind compare on
//! the same clock.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Offset-less layouts, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Space-separated layout carrying an explicit offset.
const OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// Parse a service timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, CoreError> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(trimmed, OFFSET_FORMAT) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(CoreError::Timestamp {
        value: value.to_string(),
        reason: "expected RFC 3339 or 'YYYY-MM-DD HH:MM:SS[.f]'".to_string(),
    })
}

/// `#[serde(with = ...)]` adapter for required timestamps.
pub mod serde_utc {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::Timestamp;

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(default, with = ...)]` adapter for optional timestamps.
pub mod serde_utc_option {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::Timestamp;

    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse_timestamp(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
