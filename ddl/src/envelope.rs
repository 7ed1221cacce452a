//! Parses the schema-change envelope's `payload.tableChanges[0]` entry.
//! Only the first element is consumed — a second or later entry is
//! logged and dropped (multi-statement envelopes are not split).

use std::collections::HashMap;

use common::err::CdcError;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Drop,
    Alter,
}

impl ChangeKind {
    fn parse(s: &str) -> Result<Self, CdcError> {
        match s {
            "CREATE" => Ok(ChangeKind::Create),
            "DROP" => Ok(ChangeKind::Drop),
            "ALTER" => Ok(ChangeKind::Alter),
            other => Err(CdcError::Parse(format!("unrecognized tableChanges type: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_name: String,
    pub length: Option<i64>,
    pub scale: Option<i64>,
    pub optional: bool,
    pub auto_incremented: bool,
    pub default_value_expression: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TableChange {
    pub id: String,
    pub kind: ChangeKind,
    pub primary_key_columns: Vec<String>,
    pub columns: Vec<ColumnDescriptor>,
}

/// Reads `payload.tableChanges[0]`. If the array carries more entries,
/// the dropped count is logged at debug level (open question, §9). An
/// empty array is a no-op, not an error: `Ok(None)`.
pub fn parse_table_change(envelope: &Value) -> Result<Option<TableChange>, CdcError> {
    let changes = envelope
        .pointer("/payload/tableChanges")
        .and_then(Value::as_array)
        .ok_or_else(|| CdcError::Parse("missing payload.tableChanges".into()))?;

    if changes.len() > 1 {
        tracing::debug!(dropped = changes.len() - 1, "tableChanges carried more than one entry; only the first is translated");
    }

    let Some(change) = changes.first() else {
        return Ok(None);
    };

    let id = change
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| CdcError::Parse("tableChanges[0].id missing".into()))?
        .to_string();

    let kind = change
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| CdcError::Parse("tableChanges[0].type missing".into()))
        .and_then(ChangeKind::parse)?;

    let table = change.get("table");

    let primary_key_columns = table
        .and_then(|t| t.get("primaryKeyColumnNames"))
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default();

    let columns = table
        .and_then(|t| t.get("columns"))
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(parse_column).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_default();

    Ok(Some(TableChange { id, kind, primary_key_columns, columns }))
}

fn parse_column(raw: &Value) -> Result<ColumnDescriptor, CdcError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| CdcError::Parse("column descriptor is not a JSON object".into()))?;

    // Nested arrays (enumValues and similar) describe values this
    // translator never needs; only scalar keys are kept.
    let scalars: HashMap<&str, &Value> = obj
        .iter()
        .filter(|(_, v)| !v.is_array())
        .map(|(k, v)| (k.as_str(), v))
        .collect();

    let name = scalars
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CdcError::Parse("column descriptor missing name".into()))?
        .to_string();

    let type_name = scalars
        .get("typeName")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CdcError::Parse(format!("column {name} missing typeName")))?
        .to_string();

    Ok(ColumnDescriptor {
        name,
        type_name,
        length: scalars.get("length").and_then(|v| v.as_i64()),
        scale: scalars.get("scale").and_then(|v| v.as_i64()),
        optional: scalars.get("optional").and_then(|v| v.as_bool()).unwrap_or(true),
        auto_incremented: scalars.get("autoIncremented").and_then(|v| v.as_bool()).unwrap_or(false),
        default_value_expression: scalars.get("defaultValueExpression").and_then(|v| v.as_str()).map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_envelope() -> Value {
        json!({
            "payload": {
                "tableChanges": [{
                    "id": "inv.public.orders",
                    "type": "CREATE",
                    "table": {
                        "primaryKeyColumnNames": ["id"],
                        "columns": [
                            {"name": "id", "typeName": "INT", "length": null, "scale": null, "optional": false, "autoIncremented": true},
                            {"name": "status", "typeName": "ENUM", "enumValues": ["a", "b"], "optional": true}
                        ]
                    }
                }]
            }
        })
    }

    #[test]
    fn parses_id_kind_and_columns() {
        let change = parse_table_change(&sample_envelope()).unwrap().unwrap();
        assert_eq!(change.id, "inv.public.orders");
        assert_eq!(change.kind, ChangeKind::Create);
        assert_eq!(change.primary_key_columns, vec!["id".to_string()]);
        assert_eq!(change.columns.len(), 2);
        assert_eq!(change.columns[1].type_name, "ENUM");
    }

    #[test]
    fn nested_arrays_are_skipped_without_failing() {
        let change = parse_table_change(&sample_envelope()).unwrap().unwrap();
        // enumValues was present on the second column but must not
        // surface anywhere in the parsed descriptor.
        assert!(change.columns[1].default_value_expression.is_none());
    }

    #[test]
    fn multiple_table_changes_only_uses_the_first() {
        let mut envelope = sample_envelope();
        let extra = envelope["payload"]["tableChanges"][0].clone();
        envelope["payload"]["tableChanges"].as_array_mut().unwrap().push(extra);
        let change = parse_table_change(&envelope).unwrap().unwrap();
        assert_eq!(change.id, "inv.public.orders");
    }

    #[test]
    fn empty_table_changes_is_a_no_op() {
        let envelope = json!({"payload": {"tableChanges": []}});
        assert!(parse_table_change(&envelope).unwrap().is_none());
    }
}
