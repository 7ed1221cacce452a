//! Geometry sub-objects arrive as a nested JSON object (`{"wkb": "...",
//! "srid": ...}`) rather than a scalar. The decoder only needs to
//! recognize the shape so the caller can route it through the
//! transform-expression hook instead of the scalar decode path.

use serde_json::Value;

/// True when `value` looks like a Debezium geometry sub-object: a JSON
/// object carrying a `wkb` field.
pub fn is_geometry_object(value: &Value) -> bool {
    value.as_object().map(|o| o.contains_key("wkb")).unwrap_or(false)
}

/// Extracts the base64 WKB payload and optional SRID from a geometry
/// sub-object, for handing to the transform-expression rule that knows
/// how to turn it into a destination geometry literal.
pub fn extract(value: &Value) -> Option<(&str, Option<i64>)> {
    let obj = value.as_object()?;
    let wkb = obj.get("wkb")?.as_str()?;
    let srid = obj.get("srid").and_then(|v| v.as_i64());
    Some((wkb, srid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_geometry_shape() {
        let v = json!({"wkb": "AQIAAAA=", "srid": 4326});
        assert!(is_geometry_object(&v));
        assert_eq!(extract(&v), Some(("AQIAAAA=", Some(4326))));
    }

    #[test]
    fn plain_scalars_are_not_geometry() {
        assert!(!is_geometry_object(&json!(42)));
        assert!(!is_geometry_object(&json!("text")));
        assert!(!is_geometry_object(&json!({"other": 1})));
    }
}
