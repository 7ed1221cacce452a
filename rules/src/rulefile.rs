//! The on-disk JSON rule file: three flat arrays of overrides loaded once
//! at startup and merged over the compiled-in defaults.

use std::path::Path;

use common::err::CdcError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatatypeRule {
    pub translate_from: String,
    #[serde(default)]
    pub translate_from_autoinc: bool,
    pub translate_to: String,
    #[serde(default)]
    pub translate_to_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectNameRule {
    pub object_type: String,
    pub source_object: String,
    pub destination_object: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionRule {
    pub transform_from: String,
    pub transform_expression: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuleFile {
    #[serde(default)]
    pub transform_datatype_rules: Vec<DatatypeRule>,
    #[serde(default)]
    pub transform_objectname_rules: Vec<ObjectNameRule>,
    #[serde(default)]
    pub transform_expression_rules: Vec<ExpressionRule>,
}

pub fn load_rule_file<P: AsRef<Path>>(path: P) -> Result<RuleFile, CdcError> {
    let text = std::fs::read_to_string(path)?;
    let file: RuleFile = serde_json::from_str(&text)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_three_arrays() {
        let json = r#"{
            "transform_datatype_rules": [
                {"translate_from": "tinyint", "translate_to": "smallint"}
            ],
            "transform_objectname_rules": [
                {"object_type": "table", "source_object": "db.s.orders", "destination_object": "orders2"}
            ],
            "transform_expression_rules": [
                {"transform_from": "db.s.orders.amount", "transform_expression": "%d::numeric"}
            ]
        }"#;
        let parsed: RuleFile = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.transform_datatype_rules.len(), 1);
        assert_eq!(parsed.transform_objectname_rules.len(), 1);
        assert_eq!(parsed.transform_expression_rules.len(), 1);
        assert!(!parsed.transform_datatype_rules[0].translate_from_autoinc);
    }
}
