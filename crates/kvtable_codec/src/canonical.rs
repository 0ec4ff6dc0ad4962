//! Canonical JSON form used to compare values structurally.
//!
//! Two values have the same canonical text if and only if they are
//! structurally equal: object keys are written in ascending order,
//! no whitespace is emitted, and strings are never escaped beyond what
//! JSON requires.

use crate::error::{CodecError, CodecResult};
use serde::Serialize;
use serde_json::Value;

/// Returns the canonical JSON text of `value`.
#[must_use]
pub fn canonical_string(value: &Value) -> String {
    let mut out = String::with_capacity(64);
    write_canonical(value, &mut out);
    out
}

/// Serializes `value` and returns its canonical JSON text.
///
/// # Errors
///
/// Returns [`CodecError::EncodingFailed`] if `value` cannot be represented
/// as JSON.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> CodecResult<String> {
    let value = serde_json::to_value(value).map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(canonical_string(&value))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        // Display on scalars is already compact JSON.
        scalar => out.push_str(&scalar.to_string()),
    }
}
