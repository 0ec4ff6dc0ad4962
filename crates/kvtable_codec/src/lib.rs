//! # kvtable Codec
//!
//! JSON document codec for kvtable.
//!
//! This crate turns database documents into the strings handed to a
//! key-value store, and back:
//! - Compact JSON text, optionally escaped to pure ASCII
//! - Decoding accepts either form
//! - A canonical form for structural comparison of rows
//!
//! ## Usage
//!
//! ```
//! use kvtable_codec::{from_json_str, to_json_string, EncodeOptions};
//! use serde_json::{json, Value};
//!
//! let value = json!({"name": "Zoë"});
//! let text = to_json_string(&value, &EncodeOptions::ascii()).unwrap();
//! assert!(text.is_ascii());
//!
//! let decoded: Value = from_json_str(&text).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod canonical;
mod decoder;
mod encoder;
mod error;

pub use canonical::{canonical_string, to_canonical_json};
pub use decoder::from_json_str;
pub use encoder::{to_json_string, AsciiFormatter, EncodeOptions};
pub use error::{CodecError, CodecResult};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "\\PC{0,12}".prop_map(Value::String),
        ]
    }

    fn value() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("\\PC{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
            ]
        })
    }

    proptest! {
        #[test]
        fn ascii_text_decodes_to_same_value(v in value()) {
            let text = to_json_string(&v, &EncodeOptions::ascii()).unwrap();
            prop_assert!(text.is_ascii());
            let back: Value = from_json_str(&text).unwrap();
            prop_assert_eq!(back, v);
        }

        #[test]
        fn canonical_text_is_stable_across_codec(v in value()) {
            let text = to_json_string(&v, &EncodeOptions::utf8()).unwrap();
            let back: Value = from_json_str(&text).unwrap();
            prop_assert_eq!(canonical_string(&back), canonical_string(&v));
        }
    }
}
