//! Component C (expression half): per-column transform expressions.
//! `%d` stands for the decoded literal; `%1`/`%2` stand for the `wkb`
//! and `srid` fields extracted from a geometry sub-object.

use std::collections::HashMap;

use crate::rulefile::RuleFile;

pub struct TransformExpressionMap {
    map: HashMap<String, String>,
}

impl TransformExpressionMap {
    pub fn new(rules: Option<&RuleFile>) -> Self {
        let mut map = HashMap::new();
        if let Some(file) = rules {
            for rule in &file.transform_expression_rules {
                map.insert(rule.transform_from.clone(), rule.transform_expression.clone());
            }
        }
        Self { map }
    }

    pub fn has_rule(&self, fq_column: &str) -> bool {
        self.map.contains_key(fq_column)
    }

    /// Substitutes placeholders in the rule registered for `fq_column`.
    /// Returns `None` (skip transformation) when no rule applies.
    pub fn apply(&self, fq_column: &str, decoded: &str, geometry: Option<(&str, Option<i64>)>) -> Option<String> {
        let expr = self.map.get(fq_column)?;
        let mut out = expr.replace("%d", decoded);
        if let Some((wkb, srid)) = geometry {
            out = out.replace("%1", wkb);
            if let Some(srid) = srid {
                out = out.replace("%2", &srid.to_string());
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rulefile::ExpressionRule;

    fn file() -> RuleFile {
        RuleFile {
            transform_expression_rules: vec![
                ExpressionRule {
                    transform_from: "inv.public.orders.amount".into(),
                    transform_expression: "%d::numeric".into(),
                },
                ExpressionRule {
                    transform_from: "inv.public.sites.geo".into(),
                    transform_expression: "ST_GeomFromWKB(%1, %2)".into(),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn substitutes_decoded_value_placeholder() {
        let m = TransformExpressionMap::new(Some(&file()));
        assert_eq!(m.apply("inv.public.orders.amount", "19.99", None), Some("19.99::numeric".to_string()));
    }

    #[test]
    fn substitutes_geometry_placeholders() {
        let m = TransformExpressionMap::new(Some(&file()));
        let result = m.apply("inv.public.sites.geo", "", Some(("AQIAAAA=", Some(4326))));
        assert_eq!(result, Some("ST_GeomFromWKB(AQIAAAA=, 4326)".to_string()));
    }

    #[test]
    fn absence_of_a_rule_skips_transformation() {
        let m = TransformExpressionMap::new(Some(&file()));
        assert_eq!(m.apply("inv.public.orders.sku", "x", None), None);
    }
}
