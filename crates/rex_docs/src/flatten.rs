//! Nested record → flat dotted-path map.
//!
//! Objects recurse, `null` becomes [`NOT_AVAILABLE`], arrays collapse into a
//! `", "`-joined string, and every other scalar is kept as-is. Key order
//! follows the source object (`serde_json` is built with `preserve_order`).

use serde_json::{Map, Value};

/// Placeholder written for `null` leaves and columns a record does not have.
pub const NOT_AVAILABLE: &str = "N/A";

/// Ordered mapping of dotted paths to renderable scalars.
pub type FlatRecord = Map<String, Value>;

/// Flatten `value` into dotted paths rooted at `prefix`.
///
/// A non-object root is a degenerate case: with an empty prefix it yields
/// an empty map, otherwise a single field named `prefix`.
pub fn flatten(value: &Value, prefix: &str) -> FlatRecord {
    let mut out = FlatRecord::new();
    match value {
        Value::Object(map) => flatten_into(&mut out, map, prefix),
        other if !prefix.is_empty() => emit_leaf(&mut out, prefix.to_string(), other),
        _ => {}
    }
    out
}

fn flatten_into(out: &mut FlatRecord, map: &Map<String, Value>, prefix: &str) {
    for (key, value) in map {
        let path = join_path(prefix, key);
        match value {
            Value::Object(child) => flatten_into(out, child, &path),
            other => emit_leaf(out, path, other),
        }
    }
}

fn emit_leaf(out: &mut FlatRecord, path: String, value: &Value) {
    let rendered = match value {
        Value::Null => Value::String(NOT_AVAILABLE.to_string()),
        Value::Array(items) => Value::String(join_array(items)),
        scalar => scalar.clone(),
    };
    out.insert(path, rendered);
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Render array elements as text joined by `", "`.
///
/// Objects become compact JSON; they are not flattened structurally.
pub fn join_array(items: &[Value]) -> String {
    items
        .iter()
        .map(element_text)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text form of a single value, as used inside joined arrays.
pub fn element_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => join_array(items),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_leaf_becomes_not_available() {
        let flat = flatten(&json!({"a": null, "b": {"c": null}}), "");
        assert_eq!(flat["a"], json!("N/A"));
        assert_eq!(flat["b.c"], json!("N/A"));
    }

    #[test]
    fn test_array_is_joined() {
        let flat = flatten(&json!({"tags": ["a", "b"]}), "");
        assert_eq!(flat["tags"], json!("a, b"));
    }

    #[test]
    fn test_nested_objects_use_dotted_paths() {
        let flat = flatten(&json!({"a": {"b": {"c": 1}}}), "");
        assert_eq!(flat["a.b.c"], json!(1));
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn test_key_order_is_depth_first_insertion_order() {
        let flat = flatten(
            &json!({"z": 1, "m": {"y": 2, "b": 3}, "a": 4}),
            "",
        );
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "m.y", "m.b", "a"]);
    }

    #[test]
    fn test_scalars_are_kept_as_is() {
        let flat = flatten(
            &json!({"rent": 1200.5, "active": true, "start": "2024-01-01"}),
            "",
        );
        assert_eq!(flat["rent"], json!(1200.5));
        assert_eq!(flat["active"], json!(true));
        assert_eq!(flat["start"], json!("2024-01-01"));
    }

    #[test]
    fn test_empty_object_contributes_nothing() {
        let flat = flatten(&json!({"a": {}, "b": 1}), "");
        assert_eq!(flat.len(), 1);
        assert!(flat.get("a").is_none());
    }

    #[test]
    fn test_array_of_objects_is_stringified() {
        let flat = flatten(&json!({"units": [{"id": 1}, {"id": 2}]}), "");
        assert_eq!(flat["units"], json!(r#"{"id":1}, {"id":2}"#));
    }

    #[test]
    fn test_array_with_null_and_numbers() {
        let flat = flatten(&json!({"v": [1, null, "x", [2, 3]]}), "");
        assert_eq!(flat["v"], json!("1, , x, 2, 3"));
    }

    #[test]
    fn test_prefix_is_prepended() {
        let flat = flatten(&json!({"a": 1}), "root");
        assert_eq!(flat["root.a"], json!(1));
    }

    #[test]
    fn test_primitive_root_without_prefix_is_ignored() {
        assert!(flatten(&json!(42), "").is_empty());
        assert!(flatten(&json!(null), "").is_empty());
        assert!(flatten(&json!(["a"]), "").is_empty());
    }

    #[test]
    fn test_primitive_root_with_prefix_is_single_field() {
        assert_eq!(flatten(&json!(42), "value")["value"], json!(42));
        assert_eq!(flatten(&json!(null), "value")["value"], json!("N/A"));
        assert_eq!(flatten(&json!(["a", "b"]), "value")["value"], json!("a, b"));
    }
}
