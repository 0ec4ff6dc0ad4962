//! `where` statements.

use super::compare::{loose_cmp, loose_eq};
use crate::types::Row;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operator of a [`WhereStatement`].
///
/// Serialized with the short names `eq`, `bt`, `be`, `lt` and `le`. Any
/// other name is kept as [`Comparison::Other`] and matches no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Comparison {
    /// `field == toBe`, loosely.
    Equal,
    /// `field > toBe`.
    Greater,
    /// `field >= toBe`.
    GreaterOrEqual,
    /// `field < toBe`.
    Less,
    /// `field <= toBe`.
    LessOrEqual,
    /// An unrecognised operator name.
    Other(String),
}

impl Comparison {
    /// Returns the wire name of the operator.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equal => "eq",
            Self::Greater => "bt",
            Self::GreaterOrEqual => "be",
            Self::Less => "lt",
            Self::LessOrEqual => "le",
            Self::Other(name) => name,
        }
    }

    fn matches(&self, value: Option<&Value>, operand: Option<&Value>) -> bool {
        match self {
            Self::Equal => loose_eq(value, operand),
            Self::Greater => loose_cmp(value, operand) == Some(Ordering::Greater),
            Self::GreaterOrEqual => matches!(
                loose_cmp(value, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Less => loose_cmp(value, operand) == Some(Ordering::Less),
            Self::LessOrEqual => matches!(
                loose_cmp(value, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Other(_) => false,
        }
    }
}

impl From<String> for Comparison {
    fn from(name: String) -> Self {
        match name.as_str() {
            "eq" => Self::Equal,
            "bt" => Self::Greater,
            "be" => Self::GreaterOrEqual,
            "lt" => Self::Less,
            "le" => Self::LessOrEqual,
            _ => Self::Other(name),
        }
    }
}

impl From<Comparison> for String {
    fn from(cmp: Comparison) -> Self {
        match cmp {
            Comparison::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A single-field predicate: `{ type, field, toBe, fetch? }`.
///
/// A statement without `type` is *untargeted*: `update` and `delete`
/// then apply to every row of the table, while `select` matches nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WhereStatement {
    /// Comparison operator; `None` marks an untargeted statement.
    #[serde(rename = "type", default)]
    pub kind: Option<Comparison>,

    /// Field the row value is read from.
    #[serde(default)]
    pub field: String,

    /// Operand. `None` means absent, which is distinct from JSON `null`
    /// for relational operators.
    #[serde(
        rename = "toBe",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub to_be: Option<Value>,

    /// Collapse the `select` result to its first row.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fetch: bool,
}

/// Keeps an explicit `null` as `Some(Value::Null)`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl WhereStatement {
    /// Builds a statement with the given operator.
    pub fn new(kind: Comparison, field: impl Into<String>, to_be: impl Into<Value>) -> Self {
        Self {
            kind: Some(kind),
            field: field.into(),
            to_be: Some(to_be.into()),
            fetch: false,
        }
    }

    /// `field == to_be`.
    pub fn eq(field: impl Into<String>, to_be: impl Into<Value>) -> Self {
        Self::new(Comparison::Equal, field, to_be)
    }

    /// `field > to_be`.
    pub fn bt(field: impl Into<String>, to_be: impl Into<Value>) -> Self {
        Self::new(Comparison::Greater, field, to_be)
    }

    /// `field >= to_be`.
    pub fn be(field: impl Into<String>, to_be: impl Into<Value>) -> Self {
        Self::new(Comparison::GreaterOrEqual, field, to_be)
    }

    /// `field < to_be`.
    pub fn lt(field: impl Into<String>, to_be: impl Into<Value>) -> Self {
        Self::new(Comparison::Less, field, to_be)
    }

    /// `field <= to_be`.
    pub fn le(field: impl Into<String>, to_be: impl Into<Value>) -> Self {
        Self::new(Comparison::LessOrEqual, field, to_be)
    }

    /// A statement without operator: applies to all rows in update/delete.
    pub fn untargeted() -> Self {
        Self::default()
    }

    /// Marks the statement as a single-row fetch.
    #[must_use]
    pub fn fetch(mut self) -> Self {
        self.fetch = true;
        self
    }

    /// Returns true if the statement carries an operator.
    pub fn is_targeted(&self) -> bool {
        self.kind.is_some()
    }

    /// Returns true if `row` satisfies the statement.
    ///
    /// An untargeted statement or unknown operator matches nothing.
    pub fn matches(&self, row: &Row) -> bool {
        self.kind
            .as_ref()
            .is_some_and(|kind| kind.matches(row.get(&self.field), self.to_be.as_ref()))
    }

    /// Returns the matching rows, in their original order.
    pub fn apply<'a, I>(&self, rows: I) -> Vec<Row>
    where
        I: IntoIterator<Item = &'a Row>,
    {
        rows.into_iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect()
    }
}
