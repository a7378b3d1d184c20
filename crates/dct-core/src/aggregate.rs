//! Aggregation of several mappings into one, with last-wins precedence.
//!
//! - [`flat_aggregate`] merges single-level mappings.
//! - [`nested_aggregate`] merges depth-one nested mappings per top-level key.
//! - [`mixed_aggregate`] combines flat defaults, nested entries, and
//!   overrides into one nested mapping for a chosen set of top-level keys.

use serde_json::Value;
use tracing::debug;

use crate::error::{DctError, DctResult};
use crate::mapping::{value_kind, Mapping};

/// Merge mappings in order; later entries override earlier ones.
///
/// Keys keep the position of their first appearance.
pub fn flat_aggregate(mappings: &[Mapping]) -> Mapping {
    debug!(mappings = mappings.len(), "flat aggregate");
    let mut aggregated = Mapping::new();
    for mapping in mappings {
        for (key, value) in mapping {
            if let Some(previous) = aggregated.get(key) {
                debug!(key = %key, %previous, overridden_by = %value, "override");
            }
            aggregated.insert(key.clone(), value.clone());
        }
    }
    aggregated
}

/// Merge nested mappings of depth one, per top-level key.
///
/// Every top-level value must be a mapping; later sub-entries override
/// earlier ones. Top-level keys that never carry a sub-entry are absent from
/// the result.
///
/// # Examples
///
/// ```
/// use dct_core::nested_aggregate;
/// use serde_json::json;
///
/// let first = json!({"n1": {"txt": "hi", "s": 5}, "n3": {"s": 10}});
/// let second = json!({"n1": {"txt": "hey", "mst_hve": "yes"}, "n2": {"s": 2}});
/// let merged = nested_aggregate(&[
///     first.as_object().unwrap().clone(),
///     second.as_object().unwrap().clone(),
/// ]).unwrap();
/// assert_eq!(serde_json::Value::Object(merged), json!({
///     "n1": {"txt": "hey", "s": 5, "mst_hve": "yes"},
///     "n3": {"s": 10},
///     "n2": {"s": 2},
/// }));
/// ```
pub fn nested_aggregate(nested: &[Mapping]) -> DctResult<Mapping> {
    debug!(mappings = nested.len(), "nested aggregate");
    let mut aggregated = Mapping::new();
    for (index, mapping) in nested.iter().enumerate() {
        for (top, value) in mapping {
            let Value::Object(entries) = value else {
                return Err(DctError::NotAMapping {
                    at: format!("nested[{index}].{top}"),
                    found: value_kind(value),
                });
            };
            if entries.is_empty() {
                continue;
            }
            let slot = aggregated
                .entry(top.clone())
                .or_insert_with(|| Value::Object(Mapping::new()));
            if let Value::Object(slot) = slot {
                for (key, value) in entries {
                    if let Some(previous) = slot.get(key) {
                        debug!(top = %top, key = %key, %previous, overridden_by = %value, "override");
                    }
                    slot.insert(key.clone(), value.clone());
                }
            }
        }
    }
    Ok(aggregated)
}

/// Build a nested mapping for each of `top_level_keys` from three sources.
///
/// Precedence is `defaults < nested < overrides`. Each row covers the keys
/// of the aggregated `defaults`, the aggregated `nested` entries for that
/// top-level key, and `overrides`, in that first-seen order.
///
/// An override whose value is a mapping is read as a table keyed by
/// top-level key: its entry for the current key wins, otherwise the value
/// falls back to the nested entry, then the default, then `null`.
///
/// # Examples
///
/// ```
/// use dct_core::mixed_aggregate;
/// use serde_json::json;
///
/// let parameters = json!({"cat1": {"txt": "hi", "s": 5}, "cat2": {"txt": "hey", "s": 7}});
/// let overrides = json!({"s": {"cat1": 1, "cat2": 2, "cat3": 3}});
/// let out = mixed_aggregate(
///     &["cat1", "cat2", "cat3"],
///     &[],
///     &[parameters.as_object().unwrap().clone()],
///     overrides.as_object().unwrap(),
/// ).unwrap();
/// assert_eq!(serde_json::Value::Object(out), json!({
///     "cat1": {"txt": "hi", "s": 1},
///     "cat2": {"txt": "hey", "s": 2},
///     "cat3": {"s": 3},
/// }));
/// ```
pub fn mixed_aggregate<S: AsRef<str>>(
    top_level_keys: &[S],
    defaults: &[Mapping],
    nested: &[Mapping],
    overrides: &Mapping,
) -> DctResult<Mapping> {
    debug!(
        top_level_keys = top_level_keys.len(),
        defaults = defaults.len(),
        nested = nested.len(),
        overrides = overrides.len(),
        "mixed aggregate"
    );
    let flat = flat_aggregate(defaults);
    let merged = nested_aggregate(nested)?;
    let no_entries = Mapping::new();

    let mut aggregated = Mapping::new();
    for top in top_level_keys {
        let top = top.as_ref();
        let entries = match merged.get(top) {
            Some(Value::Object(entries)) => entries,
            _ => &no_entries,
        };

        let mut row = Mapping::new();
        for key in flat.keys().chain(entries.keys()).chain(overrides.keys()) {
            if row.contains_key(key) {
                continue;
            }
            let (value, source) = match overrides.get(key) {
                Some(Value::Object(table)) => match table.get(top) {
                    Some(value) => (value.clone(), "overrides"),
                    None => fallback(key, entries, &flat),
                },
                Some(value) => (value.clone(), "overrides"),
                None => fallback(key, entries, &flat),
            };
            debug!(top, key = %key, %value, source, "filled");
            row.insert(key.clone(), value);
        }

        if !row.is_empty() {
            aggregated.insert(top.to_string(), Value::Object(row));
        }
    }
    Ok(aggregated)
}

fn fallback(key: &str, entries: &Mapping, defaults: &Mapping) -> (Value, &'static str) {
    if let Some(value) = entries.get(key) {
        (value.clone(), "nested")
    } else if let Some(value) = defaults.get(key) {
        (value.clone(), "defaults")
    } else {
        (Value::Null, "no source")
    }
}
