/// Server-assigned entity identifier. Opaque (UUID-shaped) and compared
/// only in full.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Placeholder shown for a reference that does not resolve.
pub const NOT_AVAILABLE: &str = "N/A";

/// Number of leading characters kept by [`short_id`].
pub const SHORT_ID_LEN: usize = 8;

/// Cosmetic shortened form of an id for display. Never use the result as a
/// lookup key.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Serde adapter for server timestamps.
///
/// The backend emits naive ISO-8601 datetimes (no offset) for values it
/// stores in UTC, so both RFC 3339 and offset-less forms are accepted.
/// Serialization always writes RFC 3339.
pub mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Timestamp;

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<Timestamp> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
