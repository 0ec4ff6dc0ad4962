//! `orderBy` statements.

use super::compare::sort_cmp;
use crate::types::Row;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction of an [`OrderByStatement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
    /// An unrecognised direction name.
    Other(String),
}

impl From<String> for Direction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "asc" => Self::Asc,
            "desc" => Self::Desc,
            _ => Self::Other(name),
        }
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => "asc".to_string(),
            Direction::Desc => "desc".to_string(),
            Direction::Other(name) => name,
        }
    }
}

/// A single-field sort directive: `{ type: "asc" | "desc", field }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByStatement {
    /// Sort direction.
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Field to sort by.
    pub field: String,
}

impl OrderByStatement {
    /// Ascending order on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            direction: Direction::Asc,
            field: field.into(),
        }
    }

    /// Descending order on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            direction: Direction::Desc,
            field: field.into(),
        }
    }

    /// Sorts `rows` in place.
    ///
    /// The sort is stable: rows with equal keys keep their relative order
    /// in both directions. Rows missing the field go last in both
    /// directions. Returns `None`, leaving `rows` untouched, when the
    /// direction is not recognised.
    pub fn apply(&self, rows: &mut [Row]) -> Option<()> {
        let descending = match self.direction {
            Direction::Asc => false,
            Direction::Desc => true,
            Direction::Other(_) => return None,
        };

        rows.sort_by(|a, b| match (a.get(&self.field), b.get(&self.field)) {
            (Some(x), Some(y)) => {
                let ord = sort_cmp(x, y);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        Some(())
    }
}
