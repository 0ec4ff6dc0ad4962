//! Value comparison rules used by `where` and `orderBy`.
//!
//! Filters follow loose, coercing comparison semantics: `1 == "1"`,
//! `true == 1`, `null` equals only `null` or a missing field, and a
//! relational test against anything that does not coerce to a number
//! is false. Sorting uses a separate strict total order.

use kvtable_codec::canonical_string;
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

/// A value reduced to a primitive, as loose comparison sees it.
#[derive(Debug, Clone, PartialEq)]
enum Primitive<'a> {
    Missing,
    Null,
    Bool(bool),
    Number(f64),
    Text(Cow<'a, str>),
}

fn to_primitive(value: Option<&Value>) -> Primitive<'_> {
    match value {
        None => Primitive::Missing,
        Some(Value::Null) => Primitive::Null,
        Some(Value::Bool(b)) => Primitive::Bool(*b),
        Some(Value::Number(n)) => Primitive::Number(n.as_f64().unwrap_or(f64::NAN)),
        Some(Value::String(s)) => Primitive::Text(Cow::Borrowed(s)),
        Some(compound) => Primitive::Text(Cow::Owned(compound_to_string(compound))),
    }
}

/// String form of arrays and objects: arrays join their elements with
/// commas (null elements become empty), objects are opaque.
fn compound_to_string(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                Value::Array(_) | Value::Object(_) => compound_to_string(item),
                scalar => scalar.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        scalar => scalar.to_string(),
    }
}

fn to_number(p: &Primitive<'_>) -> f64 {
    match p {
        Primitive::Missing => f64::NAN,
        Primitive::Null => 0.0,
        Primitive::Bool(b) => f64::from(u8::from(*b)),
        Primitive::Number(n) => *n,
        Primitive::Text(s) => parse_number(s),
    }
}

/// Parses numeric text the way loose comparison does: surrounding
/// whitespace is ignored, empty text is zero, anything else unparseable
/// is NaN.
fn parse_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix).map_or(f64::NAN, |n| n as f64);
    }

    // Rust also accepts "inf" and "nan"; those are not numbers here.
    if !s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn cmp_utf16(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Loose equality between a row value (possibly missing) and an operand.
///
/// Two arrays, two objects, or an array and an object are equal when their
/// canonical JSON text is equal. Rows are decoded from storage on every
/// call, so there is no identity to compare: a `where` operand such as
/// `[1, 2]` matches a stored `[1, 2]`, and `{"a": 1, "b": 2}` matches
/// `{"b": 2, "a": 1}`.
pub fn loose_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    if let (
        Some(l @ (Value::Array(_) | Value::Object(_))),
        Some(r @ (Value::Array(_) | Value::Object(_))),
    ) = (left, right)
    {
        return canonical_string(l) == canonical_string(r);
    }

    primitive_eq(&to_primitive(left), &to_primitive(right))
}

fn primitive_eq(left: &Primitive<'_>, right: &Primitive<'_>) -> bool {
    use Primitive::{Bool, Missing, Null, Number, Text};

    match (left, right) {
        (Missing | Null, Missing | Null) => true,
        (Missing | Null, _) | (_, Missing | Null) => false,
        (Text(a), Text(b)) => a == b,
        (Bool(a), Bool(b)) => a == b,
        (Number(a), Number(b)) => a == b,
        _ => to_number(left) == to_number(right),
    }
}

/// Relational comparison between a row value and an operand.
///
/// Two strings compare by UTF-16 code units; everything else compares as
/// numbers. Returns `None` when either side is NaN, which makes every
/// relational operator false.
pub fn loose_cmp(left: Option<&Value>, right: Option<&Value>) -> Option<Ordering> {
    let l = to_primitive(left);
    let r = to_primitive(right);

    if let (Primitive::Text(a), Primitive::Text(b)) = (&l, &r) {
        return Some(cmp_utf16(a, b));
    }

    to_number(&l).partial_cmp(&to_number(&r))
}

/// Sort rank of a value class: numbers (with booleans and null), then
/// strings, then arrays and objects.
fn sort_rank(value: &Value) -> u8 {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Array(_) | Value::Object(_) => 2,
    }
}

/// Strict total order for sorting present values.
///
/// Values of the same class keep their natural order; across classes the
/// rank decides. Unlike [`loose_cmp`] this never reports "incomparable",
/// so a sort built on it is deterministic.
pub fn sort_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = sort_rank(left).cmp(&sort_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }

    match (left, right) {
        (Value::String(a), Value::String(b)) => cmp_utf16(a, b),
        (Value::Array(_) | Value::Object(_), _) => {
            canonical_string(left).cmp(&canonical_string(right))
        }
        _ => {
            let a = to_number(&to_primitive(Some(left)));
            let b = to_number(&to_primitive(Some(right)));
            a.total_cmp(&b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eq(a: Value, b: Value) -> bool {
        loose_eq(Some(&a), Some(&b))
    }

    #[test]
    fn loose_equality_coerces() {
        assert!(eq(json!(1), json!("1")));
        assert!(eq(json!(" 2 "), json!(2)));
        assert!(eq(json!(true), json!(1)));
        assert!(eq(json!(false), json!("0")));
        assert!(eq(json!(""), json!(0)));
        assert!(eq(json!(1.0), json!(1)));
        assert!(eq(json!([1]), json!(1)));
        assert!(eq(json!([1, 2]), json!("1,2")));
        assert!(!eq(json!("a"), json!("A")));
        assert!(!eq(json!("abc"), json!(0)));
        assert!(!eq(json!(true), json!("true")));
    }

    #[test]
    fn null_and_missing() {
        assert!(loose_eq(None, Some(&Value::Null)));
        assert!(loose_eq(None, None));
        assert!(eq(Value::Null, Value::Null));
        assert!(!eq(Value::Null, json!(0)));
        assert!(!eq(Value::Null, json!("")));
        assert!(!loose_eq(None, Some(&json!(false))));
    }

    #[test]
    fn compound_values_compare_structurally() {
        assert!(eq(json!({"a": 1, "b": 2}), json!({"b": 2, "a": 1})));
        assert!(!eq(json!([1, 2]), json!([2, 1])));
    }

    #[test]
    fn equal_nested_contents_match() {
        assert!(eq(json!([1, {"x": [2, 3]}]), json!([1, {"x": [2, 3]}])));
        assert!(!eq(json!([1, {"x": [2, 3]}]), json!([1, {"x": [3, 2]}])));
        assert!(!eq(json!([]), json!({})));
    }

    #[test]
    fn relational_numbers_and_strings() {
        assert_eq!(loose_cmp(Some(&json!(2)), Some(&json!(1))), Some(Ordering::Greater));
        assert_eq!(loose_cmp(Some(&json!("10")), Some(&json!(9))), Some(Ordering::Greater));
        // Both strings: lexicographic, not numeric.
        assert_eq!(loose_cmp(Some(&json!("10")), Some(&json!("9"))), Some(Ordering::Less));
        assert_eq!(loose_cmp(Some(&Value::Null), Some(&json!(0))), Some(Ordering::Equal));
        assert_eq!(loose_cmp(Some(&json!(true)), Some(&json!(0))), Some(Ordering::Greater));
    }

    #[test]
    fn relational_nan_is_incomparable() {
        assert_eq!(loose_cmp(None, Some(&json!(1))), None);
        assert_eq!(loose_cmp(Some(&json!("abc")), Some(&json!(1))), None);
        assert_eq!(loose_cmp(Some(&json!({"a": 1})), Some(&json!(1))), None);
    }

    #[test]
    fn parse_number_rules() {
        assert_eq!(parse_number("0x1f"), 31.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("12px").is_nan());
    }

    #[test]
    fn sort_order_is_total() {
        let mut values = vec![
            json!("b"),
            json!(3),
            json!([1]),
            json!(null),
            json!("a"),
            json!(true),
            json!(-1.5),
        ];
        values.sort_by(sort_cmp);
        assert_eq!(
            values,
            vec![
                json!(-1.5),
                json!(null),
                json!(true),
                json!(3),
                json!("a"),
                json!("b"),
                json!([1]),
            ]
        );
    }
}
