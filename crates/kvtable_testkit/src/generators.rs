//! Property-based test generators using proptest.
//!
//! Provides strategies for table definitions and rows that respect the
//! schema invariants: unique table names, unique declared fields, and
//! rows whose keys are all declared.

use kvtable_core::{Row, TableDef};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for table and field names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for scalar JSON values, including non-ASCII strings.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        "\\PC{0,8}".prop_map(Value::String),
    ]
}

/// Strategy for field values: scalars, or short arrays and objects of them.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strategy for a table definition with 1 to 6 distinct columns.
pub fn table_def_strategy() -> impl Strategy<Value = TableDef> {
    (
        name_strategy(),
        prop::collection::btree_set(name_strategy(), 1..6),
    )
        .prop_map(|(name, columns)| TableDef::new(name, columns))
}

/// Strategy for up to `max` table definitions with distinct names.
pub fn table_defs_strategy(max: usize) -> impl Strategy<Value = Vec<TableDef>> {
    prop::collection::btree_map(
        name_strategy(),
        prop::collection::btree_set(name_strategy(), 1..6),
        1..=max.max(1),
    )
    .prop_map(|tables| {
        tables
            .into_iter()
            .map(|(name, columns)| TableDef::new(name, columns))
            .collect()
    })
}

/// Strategy for a row using a subset of `fields`.
pub fn row_strategy(fields: Vec<String>) -> impl Strategy<Value = Row> {
    let len = fields.len();
    prop::collection::vec(prop::option::of(value_strategy()), len).prop_map(move |values| {
        fields
            .iter()
            .zip(values)
            .filter_map(|(field, value)| value.map(|v| (field.clone(), v)))
            .collect()
    })
}

/// Strategy for a table of rows over one numeric field `v`.
///
/// Row `i` carries `id = i`, so ordering and identity are observable.
pub fn numbered_rows_strategy(max_rows: usize) -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(prop::option::of(-20i64..20), 0..max_rows).prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let mut row = Row::new();
                row.insert("id".into(), json!(i));
                if let Some(v) = v {
                    row.insert("v".into(), json!(v));
                }
                row
            })
            .collect()
    })
}
