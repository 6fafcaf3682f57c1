use serde_json::{Map, Value};

/// Key holding the raw body when it is not a usable JSON document
pub const RAW_BODY_KEY: &str = "body";

/// Turn a response body into a map.
///
/// JSON objects are returned as is and non-empty JSON arrays are keyed by
/// element index. Anything else (invalid JSON, `null`, `false`, `0`, `""`,
/// `"0"`, empty containers, other scalars) comes back as
/// `{"body": <raw text>}`.
#[must_use]
pub fn normalize_body(contents: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(contents) {
        Ok(Value::Object(map)) if !map.is_empty() => map,
        Ok(Value::Array(items)) if !items.is_empty() => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        _ => wrap_raw(contents),
    }
}

fn wrap_raw(contents: &[u8]) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        RAW_BODY_KEY.to_owned(),
        Value::String(String::from_utf8_lossy(contents).into_owned()),
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalized(contents: &str) -> Value {
        Value::Object(normalize_body(contents.as_bytes()))
    }

    #[test]
    fn test_json_object_passes_through() {
        assert_eq!(normalized(r#"{"id":1}"#), json!({"id": 1}));
        assert_eq!(
            normalized(r#"{"user": {"tags": ["a"]}}"#),
            json!({"user": {"tags": ["a"]}})
        );
    }

    #[test]
    fn test_plain_text_is_wrapped() {
        assert_eq!(normalized("plain text"), json!({"body": "plain text"}));
        assert_eq!(normalized(""), json!({"body": ""}));
    }

    #[test]
    fn test_falsy_json_is_wrapped() {
        for raw in ["null", "false", "0", "\"\"", "\"0\"", "[]", "{}"] {
            assert_eq!(normalized(raw), json!({"body": raw}), "body {raw}");
        }
    }

    #[test]
    fn test_json_array_is_keyed_by_index() {
        assert_eq!(normalized(r#"["a", {"b": 1}]"#), json!({"0": "a", "1": {"b": 1}}));
    }

    #[test]
    fn test_truthy_scalar_is_wrapped() {
        assert_eq!(normalized("42"), json!({"body": "42"}));
        assert_eq!(normalized("\"ok\""), json!({"body": "\"ok\""}));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let map = normalize_body(&[0x66, 0x6f, 0xff]);
        assert_eq!(map[RAW_BODY_KEY], json!("fo\u{fffd}"));
    }
}
