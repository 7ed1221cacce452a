use serde_json::Value;

/// Renders one JSON field value as the raw text the decoder expects:
/// numbers and strings pass through as their natural lexeme; a nested
/// object (geometry sub-objects and similar composites) is carried as
/// its JSON text, per §4.E's "capture the entire sub-object as a single
/// JSON string value".
pub fn value_to_raw(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Object(_) | Value::Array(_) => Some(v.to_string()),
    }
}
