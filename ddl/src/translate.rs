//! Component D: turns a schema-change envelope into destination DDL.

use std::collections::HashSet;

use catalog::{CatalogResolver, DataCache};
use common::err::CdcError;
use rules::{ObjectKind, RuleSet};
use serde_json::Value;

use crate::envelope::{parse_table_change, ChangeKind, ColumnDescriptor, TableChange};
use crate::fqid::{qualified_table, quote_ident, split_id, split_source_id};

/// PostgreSQL's documented maximum `varchar`/`char` length specifier.
const MAX_ATTR_LEN: i64 = 10_485_760;

/// Translates one schema-change envelope into a single destination DDL
/// statement (or `None` for a no-op). Always invalidates the affected
/// table's DataCache entry before returning, matching §4.D.
pub async fn translate_ddl(
    envelope: &Value,
    rule_set: &RuleSet,
    resolver: &dyn CatalogResolver,
    cache: &mut DataCache,
) -> Result<Option<String>, CdcError> {
    let Some(change) = parse_table_change(envelope)? else {
        return Ok(None);
    };
    let (db, src_schema, src_table) = split_source_id(&change.id)?;

    let dest_id = rule_set.names.resolve(&change.id, ObjectKind::Table).to_string();
    let (dest_schema_opt, dest_table) = split_id(&dest_id)?;
    let dest_schema = dest_schema_opt.unwrap_or_else(|| "public".to_string());

    cache.invalidate(&dest_schema, &dest_table);

    let stmt = match change.kind {
        ChangeKind::Create => Some(emit_create(
            &change,
            &dest_schema,
            &dest_table,
            rule_set,
            &db,
            src_schema.as_deref(),
            &src_table,
        )),
        ChangeKind::Drop => Some(format!("DROP TABLE IF EXISTS {};", qualified_table(Some(&dest_schema), &dest_table))),
        ChangeKind::Alter => {
            emit_alter(&change, &dest_schema, &dest_table, rule_set, &db, src_schema.as_deref(), &src_table, resolver).await?
        }
    };

    Ok(stmt)
}

fn dest_column_name(rule_set: &RuleSet, db: &str, schema: Option<&str>, table: &str, column: &str) -> String {
    let fq = match schema {
        Some(s) => format!("{db}.{s}.{table}.{column}"),
        None => format!("{db}.{table}.{column}"),
    };
    rule_set.names.resolve(&fq, ObjectKind::Column).to_string()
}

/// A column's resolved destination type name plus its size modifier, if
/// any (`None` for a generic-serial substitution — `serial` family types
/// never take a length).
struct ResolvedType {
    dest_type: String,
    dest_size: Option<i64>,
}

/// Resolves one column's destination type: a registry hit (override rule
/// or compiled default) wins outright; a registry miss on an
/// auto-incremented column falls back to the matching `serial` family
/// (§3's `{source_type_name, auto_incremented}` key, §8 scenario 1); any
/// other miss passes the source type name through verbatim.
fn resolve_column_type(col: &ColumnDescriptor, rule_set: &RuleSet, db: &str, schema: Option<&str>, table: &str) -> ResolvedType {
    let mapping = rule_set.types.resolve(db, schema, table, &col.name, &col.type_name, col.length, col.auto_incremented);
    match mapping {
        Some(m) => ResolvedType { dest_type: m.destination_type.clone(), dest_size: m.destination_size.or(col.length) },
        None if col.auto_incremented => ResolvedType { dest_type: serial_family_for(&col.type_name).to_string(), dest_size: None },
        None => ResolvedType { dest_type: col.type_name.to_ascii_lowercase(), dest_size: col.length },
    }
}

/// Picks the `serial` family member matching the source integer type's
/// width; anything not recognizably small/big falls to plain `serial`.
fn serial_family_for(source_type: &str) -> &'static str {
    let upper = source_type.to_ascii_uppercase();
    if upper.contains("BIGINT") {
        "bigserial"
    } else if upper.contains("SMALLINT") || upper.contains("TINYINT") {
        "smallserial"
    } else {
        "serial"
    }
}

fn column_clause(col: &ColumnDescriptor, rule_set: &RuleSet, db: &str, schema: Option<&str>, table: &str) -> String {
    let dest_name = dest_column_name(rule_set, db, schema, table, &col.name);
    let resolved = resolve_column_type(col, rule_set, db, schema, table);

    let mut clause = format!("{} {}", quote_ident(&dest_name), resolved.dest_type);
    if let Some(len) = resolved.dest_size {
        if len > 0 {
            let capped = len.min(MAX_ATTR_LEN);
            match col.scale {
                Some(scale) if scale > 0 => clause.push_str(&format!("({capped},{scale})")),
                _ => clause.push_str(&format!("({capped})")),
            }
        }
    }
    if col.type_name.to_ascii_uppercase().contains("UNSIGNED") {
        clause.push_str(&format!(" CHECK ({} >= 0)", quote_ident(&dest_name)));
    }
    if !col.optional {
        clause.push_str(" NOT NULL");
    }
    if let Some(default) = &col.default_value_expression {
        if !col.auto_incremented {
            clause.push_str(&format!(" DEFAULT {default}"));
        }
    }
    clause
}

fn emit_create(
    change: &TableChange,
    dest_schema: &str,
    dest_table: &str,
    rule_set: &RuleSet,
    db: &str,
    src_schema: Option<&str>,
    src_table: &str,
) -> String {
    let mut stmts = vec![format!("CREATE SCHEMA IF NOT EXISTS {};", quote_ident(dest_schema))];

    let mut col_defs: Vec<String> =
        change.columns.iter().map(|c| column_clause(c, rule_set, db, src_schema, src_table)).collect();

    if !change.primary_key_columns.is_empty() {
        let pk_cols: Vec<String> = change
            .primary_key_columns
            .iter()
            .map(|c| quote_ident(&dest_column_name(rule_set, db, src_schema, src_table, c)))
            .collect();
        col_defs.push(format!("PRIMARY KEY({})", pk_cols.join(", ")));
    }

    stmts.push(format!(
        "CREATE TABLE IF NOT EXISTS {} ( {} );",
        qualified_table(Some(dest_schema), dest_table),
        col_defs.join(", ")
    ));
    stmts.join(" ")
}

#[allow(clippy::too_many_arguments)]
async fn emit_alter(
    change: &TableChange,
    dest_schema: &str,
    dest_table: &str,
    rule_set: &RuleSet,
    db: &str,
    src_schema: Option<&str>,
    src_table: &str,
    resolver: &dyn CatalogResolver,
) -> Result<Option<String>, CdcError> {
    let dest_entry = resolver.fetch_table_entry(dest_schema, dest_table).await?;
    let dest_columns: HashSet<&str> = dest_entry.columns.keys().map(String::as_str).collect();

    let source_names: Vec<(String, &ColumnDescriptor)> = change
        .columns
        .iter()
        .map(|c| (dest_column_name(rule_set, db, src_schema, src_table, &c.name), c))
        .collect();

    let qualified = qualified_table(Some(dest_schema), dest_table);

    if change.columns.len() > dest_entry.columns.len() {
        let additions: Vec<String> = source_names
            .iter()
            .filter(|(name, _)| !dest_columns.contains(name.as_str()))
            .map(|(_, c)| format!("ADD COLUMN {}", column_clause(c, rule_set, db, src_schema, src_table)))
            .collect();
        if additions.is_empty() {
            return Ok(None);
        }
        return Ok(Some(format!("ALTER TABLE {qualified} {};", additions.join(", "))));
    }

    if change.columns.len() < dest_entry.columns.len() {
        let source_dest_names: HashSet<&str> = source_names.iter().map(|(n, _)| n.as_str()).collect();
        let drops: Vec<String> = dest_columns
            .iter()
            .filter(|name| !source_dest_names.contains(**name))
            .map(|name| format!("DROP COLUMN {}", quote_ident(name)))
            .collect();
        if drops.is_empty() {
            return Ok(None);
        }
        return Ok(Some(format!("ALTER TABLE {qualified} {};", drops.join(", "))));
    }

    // Equal counts: modify columns matched by name; an unmatched name
    // would indicate a rename, which is out of scope — log and ignore.
    let mut modifications = Vec::new();
    for (dest_name, col) in &source_names {
        if !dest_columns.contains(dest_name.as_str()) {
            tracing::warn!(column = %col.name, destination = %dest_name, "column rename detected on an equal-count ALTER; ignoring");
            continue;
        }
        let resolved = resolve_column_type(col, rule_set, db, src_schema, src_table);

        let mut type_clause = format!("ALTER COLUMN {} SET DATA TYPE {}", quote_ident(dest_name), resolved.dest_type);
        if let Some(len) = resolved.dest_size {
            if len > 0 {
                let capped = len.min(MAX_ATTR_LEN);
                match col.scale {
                    Some(scale) if scale > 0 => type_clause.push_str(&format!("({capped},{scale})")),
                    _ => type_clause.push_str(&format!("({capped})")),
                }
            }
        }
        modifications.push(type_clause);

        match &col.default_value_expression {
            Some(default) if !col.auto_incremented => {
                modifications.push(format!("ALTER COLUMN {} SET DEFAULT {default}", quote_ident(dest_name)))
            }
            _ => modifications.push(format!("ALTER COLUMN {} DROP DEFAULT", quote_ident(dest_name))),
        }

        if col.optional {
            modifications.push(format!("ALTER COLUMN {} DROP NOT NULL", quote_ident(dest_name)));
        } else {
            modifications.push(format!("ALTER COLUMN {} SET NOT NULL", quote_ident(dest_name)));
        }
    }

    if modifications.is_empty() {
        Ok(None)
    } else {
        Ok(Some(format!("ALTER TABLE {qualified} {};", modifications.join(", "))))
    }
}
