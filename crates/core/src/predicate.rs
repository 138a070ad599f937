//! Serializable filter predicates ("domains") for rules and quants.
//!
//! A [`Predicate`] is a conjunction of `(field, operator, value)` conditions.
//! The empty predicate matches every record.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::{AttrValue, Record};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not in")]
    NotIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub value: AttrValue,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<AttrValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluate against a record.
    ///
    /// A missing field only satisfies the negative operators (`!=`, `not in`).
    /// Incomparable values never satisfy an ordering operator.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        let Some(actual) = record.field(&self.field) else {
            return matches!(self.op, Operator::Ne | Operator::NotIn);
        };

        match self.op {
            Operator::Eq => actual.same_as(&self.value),
            Operator::Ne => !actual.same_as(&self.value),
            Operator::Gt => actual.compare(&self.value) == Some(Ordering::Greater),
            Operator::Ge => matches!(
                actual.compare(&self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Lt => actual.compare(&self.value) == Some(Ordering::Less),
            Operator::Le => matches!(
                actual.compare(&self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::In => contains(&self.value, &actual),
            Operator::NotIn => !contains(&self.value, &actual),
        }
    }
}

fn contains(haystack: &AttrValue, needle: &AttrValue) -> bool {
    match haystack {
        AttrValue::List(items) => items.iter().any(|item| item.same_as(needle)),
        single => single.same_as(needle),
    }
}

/// Conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// The predicate that matches everything.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_always(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}
