//! Loosely-typed records as they arrive from the upstream export.

use serde_json::{Map, Value};

/// One record of the raw export: an arbitrary JSON object.
pub type RawRecord = Map<String, Value>;

/// Render a JSON scalar as text, or `None` for null.
///
/// Strings pass through unchanged (no trimming), numbers and booleans use
/// their JSON rendering. Arrays and objects keep their compact JSON text so
/// nothing from the export is silently dropped.
pub fn scalar_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_to_text_keeps_strings_verbatim() {
        assert_eq!(scalar_to_text(&json!("  Jane ")), Some("  Jane ".to_string()));
        assert_eq!(scalar_to_text(&json!("")), Some(String::new()));
    }

    #[test]
    fn test_scalar_to_text_null_is_none() {
        assert_eq!(scalar_to_text(&Value::Null), None);
    }

    #[test]
    fn test_scalar_to_text_renders_numbers_and_bools() {
        assert_eq!(scalar_to_text(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_to_text(&json!(0.25)), Some("0.25".to_string()));
        assert_eq!(scalar_to_text(&json!(true)), Some("true".to_string()));
    }

    #[test]
    fn test_scalar_to_text_keeps_nested_values_as_json() {
        assert_eq!(scalar_to_text(&json!([1, 2])), Some("[1,2]".to_string()));
        assert_eq!(
            scalar_to_text(&json!({"a": 1})),
            Some("{\"a\":1}".to_string())
        );
    }
}
