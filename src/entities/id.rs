//! Serde helpers for identifiers
//!
//! Some backend tables use integer keys, others strings. Ids and foreign keys
//! are always held as strings; numbers are read in their decimal form, the
//! same form [`EntityKind::record_id`](crate::core::EntityKind::record_id)
//! uses for cache keys. `null` reads as an empty (unresolvable) id.

use serde::{Deserialize, Deserializer};
use serde_json::Number;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

/// Optional references; blank and `null` read as `None`
pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<RawId>::deserialize(deserializer)?
            .map(String::from)
            .filter(|id| !id.trim().is_empty()))
    }
}
