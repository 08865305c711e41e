//! Customer profiles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer profile, keyed by the account (auth-user) id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(deserialize_with = "crate::entities::id::deserialize")]
    pub account_id: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default, with = "crate::entities::datetime::option")]
    pub birthday: Option<DateTime<Utc>>,
}

impl Customer {
    /// Name to show, or `None` when the profile has no name filled in
    pub fn display_name(&self) -> Option<&str> {
        let name = self.full_name.trim();
        (!name.is_empty()).then_some(name)
    }
}

crate::impl_entity!(Customer, Customer, account_id);
