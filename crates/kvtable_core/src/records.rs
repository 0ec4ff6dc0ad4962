//! Row operations on an in-memory database document.
//!
//! Like [`crate::schema`], everything here is storage-free. Row identity
//! is the canonical serialization of the whole row: a targeted update or
//! delete removes, for each matched row, the first live row whose
//! canonical text is identical. Duplicated rows are therefore ambiguous,
//! and an update that makes a row equal to a sibling merges their
//! identities.

use crate::error::{CoreError, CoreResult};
use crate::query::{OrderByStatement, WhereStatement};
use crate::types::{DatabaseDocument, Row, Selection, TableSchema, CREATED_AT, UPDATED_AT};
use kvtable_codec::canonical_string;
use serde_json::Value;

fn table<'a>(doc: &'a DatabaseDocument, name: &str) -> CoreResult<&'a TableSchema> {
    doc.table(name).ok_or_else(|| CoreError::table_not_found(name))
}

fn table_mut<'a>(doc: &'a mut DatabaseDocument, name: &str) -> CoreResult<&'a mut TableSchema> {
    doc.table_mut(name).ok_or_else(|| CoreError::table_not_found(name))
}

/// Checks that every key of `values` is declared on `table`.
///
/// # Errors
///
/// Returns [`CoreError::FieldNotFound`] naming the first undeclared key.
pub fn validate_fields(table: &TableSchema, values: &Row) -> CoreResult<()> {
    match values.keys().find(|key| !table.has_field(key)) {
        Some(field) => Err(CoreError::field_not_found(field.as_str(), table.name.as_str())),
        None => Ok(()),
    }
}

/// Canonical text of a row: sorted keys, compact. Two rows are the same
/// row exactly when their canonical texts are equal.
pub fn canonical_row(row: &Row) -> String {
    canonical_string(&Value::Object(row.clone()))
}

/// Removes the first live row structurally equal to `target`.
fn remove_first_equal(data: &mut Vec<Row>, target: &Row) -> bool {
    let key = canonical_row(target);
    match data.iter().position(|row| canonical_row(row) == key) {
        Some(index) => {
            data.remove(index);
            true
        }
        None => false,
    }
}

/// Appends `values` plus `created_at` to the table.
///
/// # Errors
///
/// Returns `TableNotFound` or `FieldNotFound`.
pub fn insert(
    doc: &mut DatabaseDocument,
    table_name: &str,
    mut values: Row,
    timestamp: String,
) -> CoreResult<()> {
    let table = table_mut(doc, table_name)?;
    validate_fields(table, &values)?;

    values.insert(CREATED_AT.to_string(), Value::String(timestamp));
    table.data.push(values);
    Ok(())
}

/// Filters, sorts and optionally collapses the table's rows.
///
/// - no statements: every row, in storage order
/// - `where_`: rows matching it, in storage order
/// - `order_by`: rows sorted; an unknown direction yields [`Selection::Undefined`]
/// - `where_.fetch`: the first resulting row only
///
/// # Errors
///
/// Returns `TableNotFound`.
pub fn select(
    doc: &DatabaseDocument,
    table_name: &str,
    where_: Option<&WhereStatement>,
    order_by: Option<&OrderByStatement>,
) -> CoreResult<Selection> {
    let table = table(doc, table_name)?;

    let mut rows = match where_ {
        Some(stmt) => stmt.apply(&table.data),
        None => table.data.clone(),
    };

    if let Some(order) = order_by {
        if order.apply(&mut rows).is_none() {
            return Ok(Selection::Undefined);
        }
    }

    if where_.is_some_and(|stmt| stmt.fetch) {
        return Ok(Selection::One(rows.into_iter().next()));
    }

    Ok(Selection::Rows(rows))
}

/// Writes `values` plus `updated_at` into rows of the table.
///
/// Targeted (`where_.type` set): each matching row is taken out and
/// re-appended with the new values merged in, so updated rows move to
/// the end of the table. Untargeted: every row is updated in place.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns `TableNotFound` or `FieldNotFound`.
pub fn update(
    doc: &mut DatabaseDocument,
    table_name: &str,
    mut values: Row,
    where_: &WhereStatement,
    timestamp: String,
) -> CoreResult<usize> {
    let table = table_mut(doc, table_name)?;
    validate_fields(table, &values)?;
    values.insert(UPDATED_AT.to_string(), Value::String(timestamp));

    if !where_.is_targeted() {
        for row in &mut table.data {
            for (key, value) in &values {
                row.insert(key.clone(), value.clone());
            }
        }
        return Ok(table.data.len());
    }

    let matched = where_.apply(&table.data);
    for mut snapshot in matched.iter().cloned() {
        remove_first_equal(&mut table.data, &snapshot);
        for (key, value) in &values {
            snapshot.insert(key.clone(), value.clone());
        }
        table.data.push(snapshot);
    }
    Ok(matched.len())
}

/// Removes rows from the table.
///
/// Targeted: one structurally equal live row per match. Untargeted: all
/// rows. Returns the number of rows removed.
///
/// # Errors
///
/// Returns `TableNotFound`.
pub fn delete(
    doc: &mut DatabaseDocument,
    table_name: &str,
    where_: &WhereStatement,
) -> CoreResult<usize> {
    let table = table_mut(doc, table_name)?;

    if !where_.is_targeted() {
        let removed = table.data.len();
        table.data.clear();
        return Ok(removed);
    }

    let matched = where_.apply(&table.data);
    Ok(matched
        .iter()
        .filter(|row| remove_first_equal(&mut table.data, row))
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_document;
    use crate::types::TableDef;
    use serde_json::json;

    const TS: &str = "2020-02-11T19:58:41.000Z";

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn doc_with(values: &[i64]) -> DatabaseDocument {
        let mut doc = build_document(&[
            TableDef::new("t", ["v", "flag"]),
            TableDef::new("other", ["x"]),
        ]);
        for v in values {
            doc.table_mut("t").unwrap().data.push(row(json!({"v": v})));
        }
        doc.table_mut("other").unwrap().data.push(row(json!({"x": 1})));
        doc
    }

    fn vs(doc: &DatabaseDocument) -> Vec<i64> {
        doc.table("t")
            .unwrap()
            .data
            .iter()
            .map(|r| r["v"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn insert_appends_with_created_at() {
        let mut doc = doc_with(&[]);
        insert(&mut doc, "t", row(json!({"v": 1})), TS.into()).unwrap();

        let data = &doc.table("t").unwrap().data;
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["v"], json!(1));
        assert_eq!(data[0][CREATED_AT], json!(TS));
    }

    #[test]
    fn insert_rejects_first_unknown_field() {
        let mut doc = doc_with(&[]);
        let err = insert(
            &mut doc,
            "t",
            row(json!({"v": 1, "zeta": 2, "alpha": 3})),
            TS.into(),
        )
        .unwrap_err();

        match err {
            CoreError::FieldNotFound { field, table } => {
                assert_eq!(field, "zeta");
                assert_eq!(table, "t");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(doc.table("t").unwrap().data.is_empty());
    }

    #[test]
    fn insert_unknown_table() {
        let mut doc = doc_with(&[]);
        assert!(matches!(
            insert(&mut doc, "nope", Row::new(), TS.into()),
            Err(CoreError::TableNotFound { .. })
        ));
    }

    #[test]
    fn select_all_filter_sort_fetch() {
        let doc = doc_with(&[3, 1, 2]);

        let all = select(&doc, "t", None, None).unwrap().into_rows().unwrap();
        assert_eq!(all.len(), 3);

        let filtered = select(&doc, "t", Some(&WhereStatement::bt("v", 1)), None)
            .unwrap()
            .into_rows()
            .unwrap();
        assert_eq!(filtered, vec![row(json!({"v": 3})), row(json!({"v": 2}))]);

        let sorted = select(&doc, "t", None, Some(&OrderByStatement::asc("v")))
            .unwrap()
            .into_rows()
            .unwrap();
        assert_eq!(
            sorted.iter().map(|r| r["v"].as_i64().unwrap()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let top = select(
            &doc,
            "t",
            Some(&WhereStatement::be("v", 2).fetch()),
            Some(&OrderByStatement::desc("v")),
        )
        .unwrap();
        assert_eq!(top, Selection::One(Some(row(json!({"v": 3})))));

        let none = select(&doc, "t", Some(&WhereStatement::bt("v", 9).fetch()), None).unwrap();
        assert_eq!(none, Selection::One(None));
    }

    #[test]
    fn select_unknown_direction_is_undefined() {
        let doc = doc_with(&[1, 2]);
        let order: OrderByStatement =
            serde_json::from_value(json!({"type": "sideways", "field": "v"})).unwrap();

        let result = select(&doc, "t", Some(&WhereStatement::bt("v", 0).fetch()), Some(&order));
        assert!(result.unwrap().is_undefined());
    }

    #[test]
    fn select_with_untargeted_where_matches_nothing() {
        let doc = doc_with(&[1, 2]);
        let result = select(&doc, "t", Some(&WhereStatement::untargeted()), None).unwrap();
        assert_eq!(result, Selection::Rows(Vec::new()));
    }

    #[test]
    fn targeted_update_replaces_matches_only() {
        let mut doc = doc_with(&[1, 2]);
        let n = update(
            &mut doc,
            "t",
            row(json!({"flag": true})),
            &WhereStatement::eq("v", 1),
            TS.into(),
        )
        .unwrap();

        assert_eq!(n, 1);
        let data = &doc.table("t").unwrap().data;
        assert_eq!(data.len(), 2);
        assert_eq!(data[0], row(json!({"v": 2})));
        assert_eq!(data[1], row(json!({"v": 1, "flag": true, "updated_at": TS})));
    }

    #[test]
    fn targeted_update_with_duplicates_keeps_row_count() {
        let mut doc = doc_with(&[1, 1, 2]);
        let n = update(
            &mut doc,
            "t",
            row(json!({"flag": false})),
            &WhereStatement::eq("v", 1),
            TS.into(),
        )
        .unwrap();

        assert_eq!(n, 2);
        assert_eq!(vs(&doc), vec![2, 1, 1]);
        let data = &doc.table("t").unwrap().data;
        assert!(data[1..].iter().all(|r| r["flag"] == json!(false)));
    }

    #[test]
    fn untargeted_update_touches_every_row_in_place() {
        let mut doc = doc_with(&[1, 2]);
        update(
            &mut doc,
            "t",
            row(json!({"flag": true})),
            &WhereStatement::untargeted(),
            TS.into(),
        )
        .unwrap();

        assert_eq!(vs(&doc), vec![1, 2]);
        assert!(doc.table("t").unwrap().data.iter().all(|r| {
            r["flag"] == json!(true) && r[UPDATED_AT] == json!(TS)
        }));
    }

    #[test]
    fn update_validates_fields() {
        let mut doc = doc_with(&[1]);
        let err = update(
            &mut doc,
            "t",
            row(json!({"bogus": 1})),
            &WhereStatement::untargeted(),
            TS.into(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::FieldNotFound { .. }));
        assert!(!doc.table("t").unwrap().data[0].contains_key(UPDATED_AT));
    }

    #[test]
    fn unknown_operator_update_changes_nothing() {
        let mut doc = doc_with(&[1]);
        let stmt: WhereStatement =
            serde_json::from_value(json!({"type": "ne", "field": "v", "toBe": 5})).unwrap();
        let n = update(&mut doc, "t", row(json!({"flag": true})), &stmt, TS.into()).unwrap();
        assert_eq!(n, 0);
        assert_eq!(doc.table("t").unwrap().data[0], row(json!({"v": 1})));
    }

    #[test]
    fn targeted_delete_removes_one_per_match() {
        let mut doc = doc_with(&[1, 2, 1, 3]);
        let n = delete(&mut doc, "t", &WhereStatement::le("v", 2)).unwrap();
        assert_eq!(n, 3);
        assert_eq!(vs(&doc), vec![3]);
    }

    #[test]
    fn untargeted_delete_clears_only_that_table() {
        let mut doc = doc_with(&[1, 2]);
        let n = delete(&mut doc, "t", &WhereStatement::untargeted()).unwrap();
        assert_eq!(n, 2);
        assert!(doc.table("t").unwrap().data.is_empty());
        assert_eq!(doc.table("other").unwrap().data.len(), 1);
    }

    #[test]
    fn canonical_row_sorts_keys() {
        assert_eq!(
            canonical_row(&row(json!({"b": 1, "a": [true, null]}))),
            r#"{"a":[true,null],"b":1}"#
        );
    }

    #[test]
    fn structural_identity_ignores_key_order() {
        let mut doc = doc_with(&[]);
        doc.table_mut("t")
            .unwrap()
            .data
            .push(row(json!({"flag": 1, "v": 7})));

        let n = delete(&mut doc, "t", &WhereStatement::eq("v", 7)).unwrap();
        assert_eq!(n, 1);
        assert!(doc.table("t").unwrap().data.is_empty());
    }
}
