//! Benchmark utilities for kvtable.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use kvtable_core::{schema, DatabaseDocument, Row, TableDef};
use rand::Rng;
use serde_json::json;

/// Table used by every benchmark.
pub const TABLE: &str = "bench";

/// Definition of [`TABLE`].
pub fn bench_table() -> TableDef {
    TableDef::new(TABLE, ["id", "name", "score", "city"])
}

const CITIES: [&str; 5] = ["Lisboa", "Zürich", "東京", "Kraków", "Oslo"];

/// Generates `count` random rows over [`bench_table`]'s fields.
pub fn random_rows(count: usize) -> Vec<Row> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|id| {
            let value = json!({
                "id": id,
                "name": format!("user-{}", rng.gen_range(0..100_000)),
                "score": rng.gen_range(0..1_000),
                "city": CITIES[rng.gen_range(0..CITIES.len())],
            });
            match value {
                serde_json::Value::Object(map) => map,
                _ => Row::new(),
            }
        })
        .collect()
}

/// Builds a document holding [`TABLE`] filled with `count` random rows.
pub fn populated_document(count: usize) -> DatabaseDocument {
    let mut doc = schema::build_document(&[bench_table()]);
    if let Some(table) = doc.table_mut(TABLE) {
        table.data = random_rows(count);
    }
    doc
}
