//! Key-level manipulation: filtering, find-and-replace, and level swapping.
//!
//! The filter and replace tools work on a batch of mappings and return one
//! output mapping per input, in the same order. Inputs are never modified.

use serde_json::Value;
use tracing::debug;

use crate::mapping::Mapping;

/// Keep only entries whose key contains `pattern` or is listed in `exceptions`.
///
/// An empty `pattern` matches every key.
///
/// # Examples
///
/// ```
/// use dct_core::filter_keys;
/// use serde_json::json;
///
/// let kwargs = json!({"t": 1, "tweak_case": 2, "tweak_txt": "see case"});
/// let filtered = filter_keys(&[kwargs.as_object().unwrap().clone()], "tweak_", &[]);
/// assert_eq!(serde_json::Value::Object(filtered[0].clone()),
///            json!({"tweak_case": 2, "tweak_txt": "see case"}));
/// ```
pub fn filter_keys(mappings: &[Mapping], pattern: &str, exceptions: &[&str]) -> Vec<Mapping> {
    mappings
        .iter()
        .map(|mapping| {
            debug!(keys = mapping.len(), pattern, ?exceptions, "filtering keys");
            mapping
                .iter()
                .filter(|(key, _)| key.contains(pattern) || exceptions.contains(&key.as_str()))
                .inspect(|(key, _)| debug!(key = %key, "kept"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .collect()
}

/// Replace every occurrence of `find` in the keys with `replace`.
///
/// Keys listed in `exceptions` are left alone. A renamed entry moves to the
/// end of its mapping; if the new key already exists, its value is
/// overwritten in place.
///
/// # Examples
///
/// ```
/// use dct_core::replace_keys;
/// use serde_json::json;
///
/// let kwargs = json!({"first_txt": "hi", "first_kwarg": 2});
/// let renamed = replace_keys(&[kwargs.as_object().unwrap().clone()], "first_", "", &[]);
/// assert_eq!(serde_json::Value::Object(renamed[0].clone()),
///            json!({"txt": "hi", "kwarg": 2}));
/// ```
pub fn replace_keys(
    mappings: &[Mapping],
    find: &str,
    replace: &str,
    exceptions: &[&str],
) -> Vec<Mapping> {
    mappings
        .iter()
        .map(|mapping| {
            debug!(keys = mapping.len(), find, replace, ?exceptions, "replacing in keys");
            let mut renamed = mapping.clone();
            for key in mapping.keys() {
                if !key.contains(find) || exceptions.contains(&key.as_str()) {
                    continue;
                }
                let Some(value) = renamed.shift_remove(key) else {
                    continue;
                };
                let new_key = key.replace(find, replace);
                debug!(from = %key, to = %new_key, "renamed key");
                renamed.insert(new_key, value);
            }
            renamed
        })
        .collect()
}

/// Swap the top level and second level keys of a nested mapping.
///
/// `{"t": {"s": v}}` becomes `{"s": {"t": v}}`. Top-level entries that are
/// not mappings are skipped, so a mapping without nested entries swaps to
/// an empty mapping.
pub fn swap_keys(nested: &Mapping) -> Mapping {
    debug!(keys = nested.len(), "swapping key levels");
    let mut swapped = Mapping::new();
    for (top, inner) in nested {
        let Value::Object(inner) = inner else {
            continue;
        };
        for (sub, value) in inner {
            let slot = swapped
                .entry(sub.clone())
                .or_insert_with(|| Value::Object(Mapping::new()));
            if let Value::Object(slot) = slot {
                slot.insert(top.clone(), value.clone());
            }
            debug!(top = %top, sub = %sub, "swapped");
        }
    }
    swapped
}
