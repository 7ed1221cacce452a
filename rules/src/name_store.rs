//! Component C (name half): object-name remaps keyed by fully-qualified
//! external name and object kind.

use std::collections::HashMap;

use crate::rulefile::RuleFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Table,
    Column,
}

impl ObjectKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "table" => Some(ObjectKind::Table),
            "column" => Some(ObjectKind::Column),
            _ => None,
        }
    }
}

pub struct ObjectNameMap {
    map: HashMap<(String, ObjectKind), String>,
}

impl ObjectNameMap {
    pub fn new(rules: Option<&RuleFile>) -> Self {
        let mut map = HashMap::new();
        if let Some(file) = rules {
            for rule in &file.transform_objectname_rules {
                let Some(kind) = ObjectKind::parse(&rule.object_type) else {
                    tracing::warn!(object_type = %rule.object_type, "unrecognized object-name rule kind, skipping");
                    continue;
                };
                map.insert((rule.source_object.clone(), kind), rule.destination_object.clone());
            }
        }
        Self { map }
    }

    /// Returns the remapped destination name, or `external_name`
    /// unchanged when no rule applies.
    pub fn resolve<'a>(&'a self, external_name: &'a str, kind: ObjectKind) -> &'a str {
        self.map
            .get(&(external_name.to_string(), kind))
            .map(|s| s.as_str())
            .unwrap_or(external_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rulefile::ObjectNameRule;

    fn file() -> RuleFile {
        RuleFile {
            transform_objectname_rules: vec![ObjectNameRule {
                object_type: "table".into(),
                source_object: "inv.public.orders".into(),
                destination_object: "orders_v2".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn remaps_a_known_table() {
        let m = ObjectNameMap::new(Some(&file()));
        assert_eq!(m.resolve("inv.public.orders", ObjectKind::Table), "orders_v2");
    }

    #[test]
    fn absence_returns_input_unchanged() {
        let m = ObjectNameMap::new(Some(&file()));
        assert_eq!(m.resolve("inv.public.customers", ObjectKind::Table), "inv.public.customers");
    }

    #[test]
    fn kind_is_part_of_the_key() {
        let m = ObjectNameMap::new(Some(&file()));
        assert_eq!(m.resolve("inv.public.orders", ObjectKind::Column), "inv.public.orders");
    }
}
