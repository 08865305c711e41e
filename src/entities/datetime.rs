//! Serde helpers for backend timestamps
//!
//! The backend mixes RFC 3339 timestamps (`2025-01-10T09:00:00Z`), naive
//! local timestamps (`2025-01-10T09:00:00`) and bare dates (`2025-03-01`).
//! All of them are read as UTC; bare dates mean midnight.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer, de};

/// Parse any of the accepted timestamp shapes
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

/// Same as the parent module for optional fields; blank strings read as `None`
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_accepted_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        assert_eq!(parse("2025-01-10T09:00:00Z"), Some(expected));
        assert_eq!(parse("2025-01-10T11:00:00+02:00"), Some(expected));
        assert_eq!(parse("2025-01-10T09:00:00"), Some(expected));
        assert_eq!(parse("2025-01-10T09:00:00.000"), Some(expected));
        assert_eq!(parse("2025-01-10 09:00:00"), Some(expected));
        assert_eq!(
            parse("2025-03-01"),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse(""), None);
    }
}
