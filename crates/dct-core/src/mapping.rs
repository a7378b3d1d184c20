//! The mapping model and basic inspection.

use serde_json::{Map, Value};

use crate::error::{DctError, DctResult};

/// An ordered mapping of string keys to JSON values.
///
/// Insertion order is preserved (`serde_json` is built with
/// `preserve_order`), so the order entries are added in is the order they
/// are iterated, rendered and exported in.
pub type Mapping = Map<String, Value>;

/// Human-readable name of a value's kind, used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Borrow `value` as a mapping, failing with [`DctError::NotAMapping`].
pub fn as_mapping(value: &Value) -> DctResult<&Mapping> {
    value.as_object().ok_or_else(|| DctError::NotAMapping {
        at: "input".into(),
        found: value_kind(value),
    })
}

/// Nesting depth of a mapping.
///
/// An empty mapping has depth 0, a mapping of scalars depth 1, and every
/// level of nested mappings adds one. Sequences are leaves.
///
/// # Examples
///
/// ```
/// use dct_core::depth;
/// use serde_json::json;
///
/// assert_eq!(depth(&json!({})).unwrap(), 0);
/// assert_eq!(depth(&json!({"a": 1, "b": 2})).unwrap(), 1);
/// assert_eq!(depth(&json!({"a": {"b": 1}})).unwrap(), 2);
/// assert!(depth(&json!(7)).is_err());
/// ```
pub fn depth(value: &Value) -> DctResult<usize> {
    let mapping = as_mapping(value)?;
    Ok(mapping_depth(mapping))
}

fn mapping_depth(mapping: &Mapping) -> usize {
    if mapping.is_empty() {
        return 0;
    }
    let deepest = mapping
        .values()
        .map(|v| match v {
            Value::Object(inner) => mapping_depth(inner),
            _ => 0,
        })
        .max()
        .unwrap_or(0);
    deepest + 1
}
