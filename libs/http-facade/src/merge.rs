//! Helpers over `serde_json` maps: recursive option merging and the
//! bracketed key flattening used for form bodies and query strings.

use serde_json::{Map, Value};

/// Merge `overlay` into `base`, descending into nested objects.
///
/// When both sides hold an object under the same key the two objects are
/// merged key by key. For every other pair the overlay value replaces the
/// base value, arrays included.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match value {
            Value::Object(nested) if matches!(base.get(&key), Some(Value::Object(_))) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    deep_merge(existing, nested);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Shallow merge: keys of `overlay` overwrite those of `base`
pub fn flat_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    base.extend(overlay);
}

/// Flatten a map into `key=value` pairs the way form encoders expect nested
/// data: `{"a": {"b": 1}, "c": [2, 3]}` becomes `a[b]=1`, `c[0]=2`,
/// `c[1]=3`. Nulls are dropped, booleans become `1`/`0`.
#[must_use]
pub fn flatten_pairs(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in map {
        push_pairs(&mut pairs, key.clone(), value);
    }
    pairs
}

fn push_pairs(pairs: &mut Vec<(String, String)>, prefix: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => pairs.push((prefix, if *flag { "1" } else { "0" }.to_owned())),
        Value::Number(number) => pairs.push((prefix, number.to_string())),
        Value::String(text) => pairs.push((prefix, text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pairs(pairs, format!("{prefix}[{index}]"), item);
            }
        }
        Value::Object(fields) => {
            for (key, item) in fields {
                push_pairs(pairs, format!("{prefix}[{key}]"), item);
            }
        }
    }
}
