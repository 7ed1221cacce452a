//! Parses `payload.op`, `payload.source.{db,schema,table}`, the
//! `payload.before`/`payload.after` bodies, and the `schema.fields`
//! metadata that supplies each column's scale/time representation.

use std::collections::HashMap;

use common::err::CdcError;
use common::model::TimeRep;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlOp {
    Read,
    Insert,
    Update,
    Delete,
}

impl DmlOp {
    fn parse(s: &str) -> Result<Self, CdcError> {
        match s {
            "r" => Ok(DmlOp::Read),
            "c" => Ok(DmlOp::Insert),
            "u" => Ok(DmlOp::Update),
            "d" => Ok(DmlOp::Delete),
            other => Err(CdcError::Parse(format!("unrecognized payload.op: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldMeta {
    pub scale: Option<i64>,
    pub time_rep: TimeRep,
}

pub struct DmlEnvelope<'a> {
    pub op: DmlOp,
    pub source_db: String,
    pub source_schema: Option<String>,
    pub source_table: String,
    pub before: Option<&'a Map<String, Value>>,
    pub after: Option<&'a Map<String, Value>>,
    pub before_fields: HashMap<String, FieldMeta>,
    pub after_fields: HashMap<String, FieldMeta>,
}

pub fn parse_dml_envelope(envelope: &Value) -> Result<DmlEnvelope<'_>, CdcError> {
    let op_str = envelope
        .pointer("/payload/op")
        .and_then(Value::as_str)
        .ok_or_else(|| CdcError::Parse("missing payload.op".into()))?;
    let op = DmlOp::parse(op_str)?;

    let source = envelope
        .pointer("/payload/source")
        .ok_or_else(|| CdcError::Parse("missing payload.source".into()))?;
    let source_db = source
        .get("db")
        .and_then(Value::as_str)
        .ok_or_else(|| CdcError::Parse("missing payload.source.db".into()))?
        .to_string();
    let source_schema = source.get("schema").and_then(Value::as_str).map(String::from);
    let source_table = source
        .get("table")
        .and_then(Value::as_str)
        .ok_or_else(|| CdcError::Parse("missing payload.source.table".into()))?
        .to_string();

    let before = envelope.pointer("/payload/before").and_then(Value::as_object);
    let after = envelope.pointer("/payload/after").and_then(Value::as_object);

    match op {
        DmlOp::Read | DmlOp::Insert if after.is_none() => {
            return Err(CdcError::Parse("payload.after is required for read/insert events".into()))
        }
        DmlOp::Delete if before.is_none() => {
            return Err(CdcError::Parse("payload.before is required for delete events".into()))
        }
        DmlOp::Update if before.is_none() || after.is_none() => {
            return Err(CdcError::Parse("payload.before and payload.after are both required for update events".into()))
        }
        _ => {}
    }

    let before_fields = field_metadata(envelope, "before");
    let after_fields = field_metadata(envelope, "after");

    Ok(DmlEnvelope { op, source_db, source_schema, source_table, before, after, before_fields, after_fields })
}

/// Collects `{name: FieldMeta}` from the schema sub-struct named
/// `struct_field_name` (`"before"` or `"after"`) out of the top-level
/// `schema.fields[0|1]` array.
fn field_metadata(envelope: &Value, struct_field_name: &str) -> HashMap<String, FieldMeta> {
    let mut out = HashMap::new();
    let Some(top_fields) = envelope.pointer("/schema/fields").and_then(Value::as_array) else {
        return out;
    };
    let Some(matched) = top_fields.iter().find(|f| f.get("field").and_then(Value::as_str) == Some(struct_field_name))
    else {
        return out;
    };
    let Some(cols) = matched.get("fields").and_then(Value::as_array) else {
        return out;
    };
    for col in cols {
        let Some(name) = col.get("field").and_then(Value::as_str) else { continue };
        let scale = col.pointer("/parameters/scale").and_then(Value::as_str).and_then(|s| s.parse::<i64>().ok());
        let time_rep = col.get("name").and_then(Value::as_str).map(TimeRep::from_schema_name).unwrap_or_default();
        out.insert(name.to_string(), FieldMeta { scale, time_rep });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "schema": {
                "fields": [
                    {"field": "before", "fields": [
                        {"field": "amount", "name": "org.apache.kafka.connect.data.Decimal", "parameters": {"scale": "2"}}
                    ]},
                    {"field": "after", "fields": [
                        {"field": "amount", "name": "org.apache.kafka.connect.data.Decimal", "parameters": {"scale": "2"}},
                        {"field": "created_at", "name": "io.debezium.time.MicroTimestamp"}
                    ]}
                ]
            },
            "payload": {
                "op": "c",
                "source": {"db": "inv", "schema": "public", "table": "orders"},
                "after": {"id": 1, "amount": "AQ==", "created_at": 1700000000000000i64}
            }
        })
    }

    #[test]
    fn parses_op_and_source() {
        let env = parse_dml_envelope(&sample()).unwrap();
        assert_eq!(env.op, DmlOp::Insert);
        assert_eq!(env.source_db, "inv");
        assert_eq!(env.source_schema.as_deref(), Some("public"));
        assert_eq!(env.source_table, "orders");
    }

    #[test]
    fn collects_field_metadata_for_after() {
        let env = parse_dml_envelope(&sample()).unwrap();
        let meta = env.after_fields.get("created_at").unwrap();
        assert_eq!(meta.time_rep, TimeRep::MicroTimestamp);
        let amount = env.after_fields.get("amount").unwrap();
        assert_eq!(amount.scale, Some(2));
    }

    #[test]
    fn insert_without_after_is_a_parse_error() {
        let mut bad = sample();
        bad["payload"].as_object_mut().unwrap().remove("after");
        assert!(parse_dml_envelope(&bad).is_err());
    }
}
