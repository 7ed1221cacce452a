//! Component E: the DML Translator.

use catalog::{CatalogResolver, DataCache, TableEntry};
use common::config::EmissionMode;
use common::err::CdcError;
use decode::{decode_value, DecodeInput};
use rules::{ObjectKind, RuleSet};
use serde_json::{Map, Value};

use crate::envelope::{parse_dml_envelope, DmlOp, FieldMeta};
use crate::value::value_to_raw;

/// One destination-positioned, already-decoded field: the raw decoded
/// text (quoted when SQL mode asked for it, bare otherwise) plus enough
/// catalog metadata for the applier's tuple-mode binder.
#[derive(Debug, Clone)]
pub struct ColumnValue {
    pub dest_name: String,
    pub position: i32,
    pub oid: u32,
    pub typemod: i32,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DmlTuple {
    pub op: DmlOp,
    pub schema: String,
    pub table: String,
    pub table_oid: u32,
    pub primary_key: Vec<String>,
    pub before: Vec<ColumnValue>,
    pub after: Vec<ColumnValue>,
}

#[derive(Debug, Clone)]
pub enum Emission {
    Sql(String),
    Tuple(DmlTuple),
}

/// Translates one DML envelope, resolving the destination catalog entry
/// (populating the DataCache on a miss) and emitting either a SQL
/// statement or a positional tuple, per the connector's emission mode.
pub async fn translate_dml(
    envelope: &Value,
    rule_set: &RuleSet,
    resolver: &dyn CatalogResolver,
    cache: &mut DataCache,
    emission_mode: EmissionMode,
) -> Result<Emission, CdcError> {
    let parsed = parse_dml_envelope(envelope)?;

    let fq_table_id = match &parsed.source_schema {
        Some(s) => format!("{}.{}.{}", parsed.source_db, s, parsed.source_table),
        None => format!("{}.{}", parsed.source_db, parsed.source_table),
    };
    let dest_id = rule_set.names.resolve(&fq_table_id, ObjectKind::Table).to_string();
    let (dest_schema_opt, dest_table) = ddl::fqid::split_id(&dest_id)?;
    let dest_schema = dest_schema_opt.unwrap_or_else(|| "public".to_string()).to_ascii_lowercase();
    let dest_table = dest_table.to_ascii_lowercase();

    if cache.get(&dest_schema, &dest_table).is_none() {
        tracing::debug!(schema = %dest_schema, table = %dest_table, "populating DataCache entry");
        let entry = resolver.fetch_table_entry(&dest_schema, &dest_table).await?;
        cache.insert(&dest_schema, &dest_table, entry);
    }
    let entry = cache
        .get(&dest_schema, &dest_table)
        .ok_or_else(|| CdcError::Catalog(format!("destination table {dest_schema}.{dest_table} not found after resolution")))?
        .clone();

    let quote_for_sql = matches!(emission_mode, EmissionMode::Sql);

    let before = match parsed.before {
        Some(body) => decode_body(
            body,
            &parsed.before_fields,
            &entry,
            rule_set,
            &parsed.source_db,
            parsed.source_schema.as_deref(),
            &parsed.source_table,
            quote_for_sql,
        )?,
        None => Vec::new(),
    };
    let after = match parsed.after {
        Some(body) => decode_body(
            body,
            &parsed.after_fields,
            &entry,
            rule_set,
            &parsed.source_db,
            parsed.source_schema.as_deref(),
            &parsed.source_table,
            quote_for_sql,
        )?,
        None => Vec::new(),
    };

    let tuple = DmlTuple {
        op: parsed.op,
        schema: dest_schema,
        table: dest_table,
        table_oid: entry.table_oid,
        primary_key: entry.primary_key.clone(),
        before,
        after,
    };

    match emission_mode {
        EmissionMode::Sql => Ok(Emission::Sql(render_sql(&tuple))),
        EmissionMode::Tuple => Ok(Emission::Tuple(tuple)),
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_body(
    body: &Map<String, Value>,
    fields: &std::collections::HashMap<String, FieldMeta>,
    entry: &TableEntry,
    rule_set: &RuleSet,
    db: &str,
    schema: Option<&str>,
    table: &str,
    quote_for_sql: bool,
) -> Result<Vec<ColumnValue>, CdcError> {
    let mut out = Vec::with_capacity(body.len());
    for (column, raw) in body {
        let fq_column = match schema {
            Some(s) => format!("{db}.{s}.{table}.{column}"),
            None => format!("{db}.{table}.{column}"),
        };
        let dest_name = rule_set.names.resolve(&fq_column, ObjectKind::Column).to_string();

        let col_entry = entry
            .columns
            .get(&dest_name)
            .ok_or_else(|| CdcError::Mapping(format!("destination column {dest_name} not found for {db}.{table}")))?;

        let meta = fields.get(column).cloned().unwrap_or_default();
        let class = catalog::class_for_oid(col_entry.oid);

        let decoded = decode_column(raw, class, col_entry.typemod, meta.scale.map(|s| s as i32), meta.time_rep, quote_for_sql, &fq_column, rule_set)?;

        out.push(ColumnValue {
            dest_name,
            position: col_entry.position,
            oid: col_entry.oid,
            typemod: col_entry.typemod,
            value: decoded,
        });
    }
    out.sort_by_key(|c| c.position);
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn decode_column(
    raw: &Value,
    class: decode::DestinationClass,
    typemod: i32,
    scale: Option<i32>,
    time_rep: common::model::TimeRep,
    quote_for_sql: bool,
    fq_column: &str,
    rule_set: &RuleSet,
) -> Result<Option<String>, CdcError> {
    if raw.is_null() {
        return Ok(None);
    }

    if decode::geometry::is_geometry_object(raw) {
        if let Some((wkb, srid)) = decode::geometry::extract(raw) {
            if let Some(out) = rule_set.expressions.apply(fq_column, "", Some((wkb, srid))) {
                return Ok(Some(out));
            }
        }
        let text = raw.to_string();
        return Ok(Some(if quote_for_sql { format!("'{}'", text.replace('\'', "''")) } else { text }));
    }

    let raw_text = value_to_raw(raw);
    let input = DecodeInput {
        destination_class: class,
        typemod,
        scale,
        time_rep,
        raw_value: raw_text.as_deref(),
        quote_for_sql,
    };
    match decode_value(&input)? {
        None => Ok(None),
        Some(decoded) => Ok(Some(rule_set.expressions.apply(fq_column, &decoded, None).unwrap_or(decoded))),
    }
}

fn render_sql(tuple: &DmlTuple) -> String {
    let qualified = ddl::fqid::qualified_table(Some(&tuple.schema), &tuple.table);
    match tuple.op {
        DmlOp::Read | DmlOp::Insert => {
            let cols: Vec<&str> = tuple.after.iter().map(|c| c.dest_name.as_str()).collect();
            let literals: Vec<String> = tuple.after.iter().map(|c| c.value.clone().unwrap_or_else(|| "NULL".to_string())).collect();
            format!(
                "INSERT INTO {qualified}({}) VALUES({});",
                cols.iter().map(|c| ddl::fqid::quote_ident(c)).collect::<Vec<_>>().join(", "),
                literals.join(", ")
            )
        }
        DmlOp::Delete => format!("DELETE FROM {qualified} WHERE {};", where_clause(&tuple.before, &tuple.primary_key)),
        DmlOp::Update => {
            let set_clause = tuple
                .after
                .iter()
                .map(|c| format!("{} = {}", ddl::fqid::quote_ident(&c.dest_name), c.value.clone().unwrap_or_else(|| "NULL".to_string())))
                .collect::<Vec<_>>()
                .join(", ");
            format!("UPDATE {qualified} SET {set_clause} WHERE {};", where_clause(&tuple.before, &tuple.primary_key))
        }
    }
}

/// The WHERE clause matches on the primary key when one is declared,
/// otherwise on every before-image column.
fn where_clause(before: &[ColumnValue], primary_key: &[String]) -> String {
    let columns: Vec<&ColumnValue> = if primary_key.is_empty() {
        before.iter().collect()
    } else {
        before.iter().filter(|c| primary_key.contains(&c.dest_name)).collect()
    };
    columns
        .iter()
        .map(|c| match &c.value {
            Some(v) => format!("{} = {v}", ddl::fqid::quote_ident(&c.dest_name)),
            None => format!("{} IS NULL", ddl::fqid::quote_ident(&c.dest_name)),
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}
