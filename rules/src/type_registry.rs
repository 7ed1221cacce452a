//! Component B: resolves a source column type to a destination type
//! name and size, per source flavor, with user overrides layered on top
//! of a compiled-in default table.

use std::collections::HashMap;

use common::config::SourceFlavor;

use crate::rulefile::RuleFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    pub destination_type: String,
    pub destination_size: Option<i64>,
}

/// bit(1) is the one case the two-tier key needs a length suffix for:
/// distinguishing a single-bit flag (→ boolean) from a wider bit column
/// (→ varbit).
const BOOLEAN_BIT_WIDTH: i64 = 1;

pub struct TypeMappingRegistry {
    global: HashMap<String, TypeMapping>,
    column: HashMap<String, TypeMapping>,
}

impl TypeMappingRegistry {
    pub fn new(flavor: SourceFlavor, overrides: Option<&RuleFile>) -> Self {
        let mut global = default_table(flavor);
        // The rule file only carries bare type names, so every override
        // lands in `global`; `column` stays reserved for a future
        // column-scoped override syntax.
        let column = HashMap::new();

        if let Some(file) = overrides {
            for rule in &file.transform_datatype_rules {
                let mapping = TypeMapping {
                    destination_type: rule.translate_to.clone(),
                    destination_size: rule.translate_to_size,
                };
                let key = type_key(&rule.translate_from, None, rule.translate_from_autoinc);
                global.insert(key, mapping);
            }
        }
        Self { global, column }
    }

    /// Two-tier lookup: `db.schema.table.column.source_type[(length)]`
    /// first, then the bare `source_type[(length)]` global key. The
    /// type-mapping key is `{source_type_name, auto_incremented}` (§3):
    /// an auto-incremented column only ever matches an entry registered
    /// with `translate_from_autoinc: true` — it never falls back to the
    /// plain entry for the same source type, since a registry miss on an
    /// auto-incremented column is the caller's cue to substitute a
    /// `serial` family type instead. A miss returns `None`.
    pub fn resolve(
        &self,
        db: &str,
        schema: Option<&str>,
        table: &str,
        column: &str,
        source_type: &str,
        length: Option<i64>,
        auto_incremented: bool,
    ) -> Option<TypeMapping> {
        let fq_column = match schema {
            Some(s) => format!("{db}.{s}.{table}.{column}"),
            None => format!("{db}.{table}.{column}"),
        };

        if let Some(len) = length {
            if len == BOOLEAN_BIT_WIDTH {
                let key = format!("{fq_column}.{}", type_key(source_type, Some(len), auto_incremented));
                if let Some(m) = self.column.get(&key) {
                    return Some(m.clone());
                }
                let key = type_key(source_type, Some(len), auto_incremented);
                if let Some(m) = self.global.get(&key) {
                    return Some(m.clone());
                }
            }
        }

        let key = format!("{fq_column}.{}", type_key(source_type, None, auto_incremented));
        if let Some(m) = self.column.get(&key) {
            return Some(m.clone());
        }
        self.global.get(&type_key(source_type, None, auto_incremented)).cloned()
    }
}

fn normalize(source_type: &str) -> String {
    source_type.trim().to_ascii_lowercase()
}

/// Builds the normalized lookup/insertion key for a source type, folding
/// in the optional length suffix and the `auto_incremented` dimension of
/// the `{source_type_name, auto_incremented}` key (§3). Auto-incremented
/// entries live in a disjoint keyspace from their plain counterparts.
fn type_key(source_type: &str, length: Option<i64>, auto_incremented: bool) -> String {
    let mut key = normalize(source_type);
    if let Some(len) = length {
        key = format!("{key}({len})");
    }
    if auto_incremented {
        key.push_str("#autoinc");
    }
    key
}

fn default_table(flavor: SourceFlavor) -> HashMap<String, TypeMapping> {
    let mut m = HashMap::new();
    let mut add = |from: &str, to: &str, size: Option<i64>| {
        m.insert(
            from.to_string(),
            TypeMapping {
                destination_type: to.to_string(),
                destination_size: size,
            },
        );
    };

    match flavor {
        SourceFlavor::MySql => {
            add("tinyint", "smallint", None);
            add("tinyint(1)", "boolean", None);
            add("mediumint", "integer", None);
            add("bit(1)", "boolean", None);
            add("datetime", "timestamp", None);
            add("longtext", "text", None);
            add("mediumtext", "text", None);
            add("tinytext", "text", None);
            add("enum", "text", None);
            add("set", "text", None);
            add("double", "double precision", None);
            add("float", "real", None);
            add("json", "jsonb", None);
        }
        SourceFlavor::SqlServer => {
            add("bit", "boolean", None);
            add("tinyint", "smallint", None);
            add("nvarchar", "text", None);
            add("nchar", "text", None);
            add("datetime2", "timestamp", None);
            add("datetimeoffset", "timestamptz", None);
            add("money", "money", None);
            add("smallmoney", "money", None);
            add("uniqueidentifier", "uuid", None);
            add("varbinary", "bytea", None);
            add("image", "bytea", None);
        }
        SourceFlavor::Oracle => {
            // No compiled-in defaults: Oracle types pass through verbatim
            // unless the rules file overrides them.
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_global_key_when_no_column_override() {
        let reg = TypeMappingRegistry::new(SourceFlavor::MySql, None);
        let m = reg.resolve("db", Some("s"), "t", "c", "TINYINT", None, false).unwrap();
        assert_eq!(m.destination_type, "smallint");
    }

    #[test]
    fn bit_width_one_maps_to_boolean_via_length_suffix() {
        let reg = TypeMappingRegistry::new(SourceFlavor::MySql, None);
        let m = reg.resolve("db", Some("s"), "t", "flag", "bit", Some(1), false).unwrap();
        assert_eq!(m.destination_type, "boolean");
    }

    #[test]
    fn wider_bit_does_not_hit_the_boolean_special_case() {
        let reg = TypeMappingRegistry::new(SourceFlavor::MySql, None);
        assert!(reg.resolve("db", Some("s"), "t", "flags", "bit", Some(8), false).is_none());
    }

    #[test]
    fn unmapped_type_is_a_miss() {
        let reg = TypeMappingRegistry::new(SourceFlavor::Oracle, None);
        assert!(reg.resolve("db", None, "t", "c", "number", None, false).is_none());
    }

    #[test]
    fn rule_file_override_wins_over_compiled_default() {
        use crate::rulefile::{DatatypeRule, RuleFile};
        let overrides = RuleFile {
            transform_datatype_rules: vec![DatatypeRule {
                translate_from: "tinyint".into(),
                translate_from_autoinc: false,
                translate_to: "integer".into(),
                translate_to_size: Some(4),
            }],
            ..Default::default()
        };
        let reg = TypeMappingRegistry::new(SourceFlavor::MySql, Some(&overrides));
        let m = reg.resolve("db", Some("s"), "t", "c", "tinyint", None, false).unwrap();
        assert_eq!(m.destination_type, "integer");
        assert_eq!(m.destination_size, Some(4));
    }

    #[test]
    fn autoinc_rule_only_matches_autoinc_lookups() {
        use crate::rulefile::{DatatypeRule, RuleFile};
        let overrides = RuleFile {
            transform_datatype_rules: vec![DatatypeRule {
                translate_from: "int".into(),
                translate_from_autoinc: true,
                translate_to: "bigserial".into(),
                translate_to_size: None,
            }],
            ..Default::default()
        };
        let reg = TypeMappingRegistry::new(SourceFlavor::MySql, Some(&overrides));

        let m = reg.resolve("db", Some("s"), "t", "id", "int", None, true).unwrap();
        assert_eq!(m.destination_type, "bigserial");

        // A non-autoincrement "int" column must not see the autoinc-keyed
        // override, and vice versa there is no compiled default for plain
        // "int" to fall back to.
        assert!(reg.resolve("db", Some("s"), "t", "qty", "int", None, false).is_none());
    }
}
