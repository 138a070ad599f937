//! Attribute values and the [`Record`] view predicates are evaluated against.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A scalar (or list) attribute value.
///
/// Untagged on the wire: `true`, `42`, `"2024-01-31T00:00:00Z"`, `"LOT-7"`,
/// `["a", "b"]`. Variant order matters for deserialization: numbers and
/// timestamps are tried before falling back to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(Decimal),
    Timestamp(DateTime<Utc>),
    Text(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Compare two values when they are comparable.
    ///
    /// Text is coerced to a number (or timestamp) when compared against one.
    /// Lists are never ordered.
    pub fn compare(&self, other: &AttrValue) -> Option<Ordering> {
        use AttrValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (Number(a), Number(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Number(a), Text(b)) => Decimal::from_str(b).ok().map(|b| a.cmp(&b)),
            (Text(a), Number(b)) => Decimal::from_str(a).ok().map(|a| a.cmp(b)),
            (Timestamp(a), Text(b)) => DateTime::parse_from_rfc3339(b)
                .ok()
                .map(|b| a.cmp(&b.with_timezone(&Utc))),
            (Text(a), Timestamp(b)) => DateTime::parse_from_rfc3339(a)
                .ok()
                .map(|a| a.with_timezone(&Utc).cmp(b)),
            _ => None,
        }
    }

    pub fn same_as(&self, other: &AttrValue) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for AttrValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Free-form attribute bag carried by demands and quants.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Anything a [`crate::Predicate`] can be evaluated against.
pub trait Record {
    /// Value of a named field, or `None` when the record has no such field.
    fn field(&self, name: &str) -> Option<AttrValue>;
}

impl Record for Attributes {
    fn field(&self, name: &str) -> Option<AttrValue> {
        self.get(name).cloned()
    }
}
