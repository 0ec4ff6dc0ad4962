//! Schema changes on an in-memory database document.
//!
//! These functions never touch storage; [`crate::Store`] loads the
//! document, calls them, and writes the result back.

use crate::error::{CoreError, CoreResult};
use crate::types::{DatabaseDocument, TableDef, TableSchema};

/// Builds a fresh document with one empty table per definition.
///
/// A definition whose name already appeared earlier in `defs` is skipped.
pub fn build_document(defs: &[TableDef]) -> DatabaseDocument {
    let mut doc = DatabaseDocument::default();
    for def in defs {
        if !doc.has_table(&def.name) {
            doc.tables.push(TableSchema::from_def(def));
        }
    }
    doc
}

/// Appends a table for every definition whose name is not taken yet.
///
/// Existing tables are left alone and reported with a warning. Returns
/// the number of tables added.
pub fn add_tables(doc: &mut DatabaseDocument, defs: &[TableDef]) -> usize {
    let mut added = 0;
    for def in defs {
        if doc.has_table(&def.name) {
            tracing::warn!(
                table = %def.name,
                "table already exists, use add_fields to extend it"
            );
            continue;
        }
        doc.tables.push(TableSchema::from_def(def));
        added += 1;
    }
    added
}

/// Appends every field of `fields` that the table does not declare yet.
///
/// Existing fields keep their position; duplicates are reported with a
/// warning and skipped. Returns the number of fields added.
///
/// # Errors
///
/// Returns [`CoreError::TableNotFound`] if the table does not exist.
pub fn add_fields<S: AsRef<str>>(
    doc: &mut DatabaseDocument,
    table_name: &str,
    fields: &[S],
) -> CoreResult<usize> {
    let table = doc
        .table_mut(table_name)
        .ok_or_else(|| CoreError::table_not_found(table_name))?;

    let mut added = 0;
    for field in fields {
        let field = field.as_ref();
        if table.has_field(field) {
            tracing::warn!(table = %table_name, field, "field already exists");
            continue;
        }
        table.fields.push(field.to_string());
        added += 1;
    }
    Ok(added)
}
