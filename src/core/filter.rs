//! List filters passed to the repository collaborator

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A condition on a single top-level record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Condition {
    /// Field equals the value
    Eq(Value),

    /// Field equals any of the values
    AnyOf(Vec<Value>),
}

impl Condition {
    /// Check a field value against this condition.
    ///
    /// Strings and numbers compare loosely (`"7"` matches `7`) because
    /// backends are not consistent about id encodings.
    pub fn matches(&self, field: &Value) -> bool {
        match self {
            Condition::Eq(expected) => loose_eq(field, expected),
            Condition::AnyOf(options) => options.iter().any(|o| loose_eq(field, o)),
        }
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            s == &n.to_string()
        }
        _ => a == b,
    }
}

/// Conjunction of field conditions
///
/// # Example
/// ```
/// use stayboard::core::ListFilter;
/// use serde_json::json;
///
/// let filter = ListFilter::new()
///     .eq("customer_id", "acc-1")
///     .any_of("status", ["NoProgress", "InProgress"]);
///
/// assert!(filter.matches(&json!({"customer_id": "acc-1", "status": "InProgress"})));
/// assert!(!filter.matches(&json!({"customer_id": "acc-1", "status": "Finish"})));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFilter {
    conditions: BTreeMap<String, Condition>,
}

impl ListFilter {
    /// A filter that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .insert(field.into(), Condition::Eq(value.into()));
        self
    }

    /// Require `field` to be one of `values`
    pub fn any_of<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions
            .insert(field.into(), Condition::AnyOf(values));
        self
    }

    /// Require `field == value` when a value is given
    pub fn eq_opt(self, field: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.eq(field, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check a raw record. A missing field never matches.
    pub fn matches(&self, record: &Value) -> bool {
        self.conditions.iter().all(|(field, condition)| {
            record
                .get(field)
                .is_some_and(|value| condition.matches(value))
        })
    }
}
