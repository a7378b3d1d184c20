//! Flattening nested mappings into single-level records and back.
//!
//! Nested keys are joined with the configured separator, so
//! `{"a": {"b": 1}}` becomes `{"a.b": 1}`. Non-empty nested mappings are
//! descended; everything else (scalars, sequences, empty mappings) is a
//! leaf and is copied unchanged. A compound key that is produced twice is a
//! collision and aborts the operation.

use serde_json::Value;
use tracing::debug;

use crate::config::NormalizeConfig;
use crate::error::{DctError, DctResult};
use crate::mapping::{as_mapping, value_kind, Mapping};

/// Normalize an arbitrary value into a flattened record.
///
/// Fails with [`DctError::NotAMapping`] when `input` is not a mapping and
/// with [`DctError::KeyCollision`] when two paths join to the same key.
///
/// # Examples
///
/// ```
/// use dct_core::{normalize, NormalizeConfig};
/// use serde_json::json;
///
/// let flat = normalize(&json!({"a": {"b": 1}}), &NormalizeConfig::default()).unwrap();
/// assert_eq!(serde_json::Value::Object(flat), json!({"a.b": 1}));
///
/// let clash = json!({"a.b": 1, "a": {"b": 2}});
/// assert!(normalize(&clash, &NormalizeConfig::default()).is_err());
/// ```
pub fn normalize(input: &Value, config: &NormalizeConfig) -> DctResult<Mapping> {
    flatten(as_mapping(input)?, config)
}

/// Normalize a sequence of records. The first failure aborts.
pub fn normalize_records(inputs: &[Value], config: &NormalizeConfig) -> DctResult<Vec<Mapping>> {
    debug!(records = inputs.len(), "normalizing records");
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let mapping = input.as_object().ok_or_else(|| DctError::NotAMapping {
                at: format!("record {index}"),
                found: value_kind(input),
            })?;
            flatten(mapping, config)
        })
        .collect()
}

/// Flatten a mapping using `config.separator` to join nested keys.
pub fn flatten(mapping: &Mapping, config: &NormalizeConfig) -> DctResult<Mapping> {
    config.validate()?;
    let mut flat = Mapping::new();
    flatten_into(&mut flat, None, mapping, config)?;
    debug!(
        input_keys = mapping.len(),
        output_keys = flat.len(),
        separator = %config.separator,
        "flattened mapping"
    );
    Ok(flat)
}

fn flatten_into(
    flat: &mut Mapping,
    prefix: Option<&str>,
    mapping: &Mapping,
    config: &NormalizeConfig,
) -> DctResult<()> {
    for (key, value) in mapping {
        let compound = match prefix {
            Some(prefix) => format!("{prefix}{}{key}", config.separator),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => {
                flatten_into(flat, Some(&compound), inner, config)?;
            }
            Value::Null if config.drop_none => {
                debug!(key = %compound, "dropped null entry");
            }
            _ => {
                if flat.contains_key(&compound) {
                    debug!(key = %compound, "compound key collision");
                    return Err(DctError::KeyCollision { key: compound });
                }
                flat.insert(compound, value.clone());
            }
        }
    }
    Ok(())
}

/// Rebuild nested mappings from a flattened record.
///
/// Keys are split on `separator`. A key whose path runs through a leaf, or
/// that lands on an existing entry, is a [`DctError::KeyCollision`]. The only
/// exception is an empty mapping meeting a mapping, which merges.
pub fn unflatten(record: &Mapping, separator: &str) -> DctResult<Mapping> {
    if separator.is_empty() {
        return Err(DctError::InvalidConfig("separator must not be empty".into()));
    }

    let mut nested = Mapping::new();
    for (key, value) in record {
        let segments: Vec<&str> = key.split(separator).collect();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };

        let mut node = &mut nested;
        for segment in parents {
            let child = node
                .entry(*segment)
                .or_insert_with(|| Value::Object(Mapping::new()));
            node = match child {
                Value::Object(inner) => inner,
                _ => return Err(DctError::KeyCollision { key: key.clone() }),
            };
        }

        let merges_empty = matches!(node.get(*last), Some(Value::Object(_)))
            && matches!(value, Value::Object(m) if m.is_empty());
        if merges_empty {
            continue;
        }
        if node.contains_key(*last) {
            return Err(DctError::KeyCollision { key: key.clone() });
        }
        node.insert((*last).to_string(), value.clone());
    }

    debug!(input_keys = record.len(), output_keys = nested.len(), "unflattened record");
    Ok(nested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn obj(value: Value) -> Mapping {
        match value {
            Value::Object(m) => m,
            other => panic!("expected object fixture, got {other}"),
        }
    }

    fn dotted() -> NormalizeConfig {
        NormalizeConfig::default()
    }

    #[test]
    fn flattens_one_level() {
        let flat = normalize(&json!({"a": {"b": 1}}), &dotted()).unwrap();
        assert_eq!(Value::Object(flat), json!({"a.b": 1}));
    }

    #[test]
    fn flattens_deep_nesting_with_custom_separator() {
        let input = json!({"x": {"y": {"z": true}, "w": "s"}, "top": 0});
        let flat = normalize(&input, &NormalizeConfig::with_separator("__")).unwrap();
        assert_eq!(
            Value::Object(flat),
            json!({"x__y__z": true, "x__w": "s", "top": 0})
        );
    }

    #[test]
    fn preserves_insertion_order() {
        let input = json!({"z": 1, "a": {"m": 2, "b": 3}, "k": 4});
        let flat = normalize(&input, &dotted()).unwrap();
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a.m", "a.b", "k"]);
    }

    #[test]
    fn sequences_and_empty_mappings_are_leaves() {
        let input = json!({"list": [{"a": 1}], "empty": {}, "n": {"e": {}}});
        let flat = normalize(&input, &dotted()).unwrap();
        assert_eq!(
            Value::Object(flat),
            json!({"list": [{"a": 1}], "empty": {}, "n.e": {}})
        );
    }

    #[test]
    fn collision_detected_either_order() {
        let first = json!({"a.b": 1, "a": {"b": 2}});
        let err = normalize(&first, &dotted()).unwrap_err();
        match err {
            DctError::KeyCollision { key } => assert_eq!(key, "a.b"),
            other => panic!("expected KeyCollision, got {:?}", other),
        }

        let second = json!({"a": {"b": 2}, "a.b": 1});
        assert!(matches!(
            normalize(&second, &dotted()),
            Err(DctError::KeyCollision { .. })
        ));
    }

    #[test]
    fn same_keys_do_not_collide_under_other_separator() {
        let input = json!({"a.b": 1, "a": {"b": 2}});
        let flat = normalize(&input, &NormalizeConfig::with_separator("/")).unwrap();
        assert_eq!(Value::Object(flat), json!({"a.b": 1, "a/b": 2}));
    }

    #[test]
    fn scalar_input_is_invalid() {
        for input in [json!(1), json!("s"), json!(null), json!([1, 2])] {
            assert!(matches!(
                normalize(&input, &dotted()),
                Err(DctError::NotAMapping { .. })
            ));
        }
    }

    #[test]
    fn drop_none_omits_null_leaves() {
        let input = json!({"a": null, "b": {"c": null, "d": 1}, "e": [null]});
        let config = NormalizeConfig {
            drop_none: true,
            ..Default::default()
        };
        let flat = normalize(&input, &config).unwrap();
        assert_eq!(Value::Object(flat), json!({"b.d": 1, "e": [null]}));
    }

    #[test]
    fn nulls_kept_by_default() {
        let flat = normalize(&json!({"a": {"b": null}}), &dotted()).unwrap();
        assert_eq!(Value::Object(flat), json!({"a.b": null}));
    }

    #[test]
    fn empty_separator_rejected() {
        let config = NormalizeConfig::with_separator("");
        assert!(matches!(
            normalize(&json!({"a": 1}), &config),
            Err(DctError::InvalidConfig(_))
        ));
    }

    #[test]
    fn records_report_failing_index() {
        let inputs = vec![json!({"a": {"b": 1}}), json!(3)];
        let err = normalize_records(&inputs, &dotted()).unwrap_err();
        match err {
            DctError::NotAMapping { at, found } => {
                assert_eq!(at, "record 1");
                assert_eq!(found, "number");
            }
            other => panic!("expected NotAMapping, got {:?}", other),
        }
    }

    #[test]
    fn records_are_flattened_independently() {
        let inputs = vec![json!({"a": {"b": 1}}), json!({"a": {"b": 2}})];
        let records = normalize_records(&inputs, &dotted()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("a.b"), Some(&json!(2)));
    }

    #[test]
    fn unflatten_rebuilds_nesting() {
        let record = obj(json!({"a.b": 1, "a.c.d": 2, "e": 3}));
        let nested = unflatten(&record, ".").unwrap();
        assert_eq!(
            Value::Object(nested),
            json!({"a": {"b": 1, "c": {"d": 2}}, "e": 3})
        );
    }

    #[test]
    fn unflatten_leaf_and_prefix_collide() {
        let record = obj(json!({"a": 1, "a.b": 2}));
        assert!(matches!(
            unflatten(&record, "."),
            Err(DctError::KeyCollision { .. })
        ));

        let record = obj(json!({"a.b": 2, "a": 1}));
        assert!(matches!(
            unflatten(&record, "."),
            Err(DctError::KeyCollision { .. })
        ));
    }

    #[test]
    fn unflatten_merges_empty_mapping() {
        let record = obj(json!({"a.b": 2, "a": {}}));
        let nested = unflatten(&record, ".").unwrap();
        assert_eq!(Value::Object(nested), json!({"a": {"b": 2}}));
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ]
    }

    fn tree() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
                prop::collection::btree_map("[a-c]{1,2}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn root() -> impl Strategy<Value = Mapping> {
        prop::collection::btree_map("[a-c]{1,2}", tree(), 0..5)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(mapping in root(), drop_none in any::<bool>()) {
            let config = NormalizeConfig { drop_none, ..Default::default() };
            let once = normalize(&Value::Object(mapping), &config).unwrap();
            let twice = normalize(&Value::Object(once.clone()), &config).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn unflatten_inverts_flatten(mapping in root()) {
            let config = NormalizeConfig::default();
            let flat = flatten(&mapping, &config).unwrap();
            let nested = unflatten(&flat, &config.separator).unwrap();
            prop_assert_eq!(nested, mapping);
        }
    }
}
