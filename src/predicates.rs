use serde_json::Value;

/// True for arrays and objects, false for every scalar including `null`.
pub fn is_object(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// True only for JSON objects.
pub fn is_plain_object(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}
