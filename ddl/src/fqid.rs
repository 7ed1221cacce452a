//! Fully-qualified id splitting. Applied to a (possibly name-remapped)
//! table id: 0 dots is a bare table, 1 dot is `db.table` or
//! `schema.table`, 2 dots is `db.schema.table` (the leading `db` part is
//! dropped — PostgreSQL has no destination-side equivalent).

use common::err::CdcError;

/// Splits a post-remap table id into `(destination_schema, table)`. A
/// bare table name resolves to no schema; the caller defaults that to
/// `"public"`.
pub fn split_id(id: &str) -> Result<(Option<String>, String), CdcError> {
    let parts: Vec<&str> = id.split('.').filter(|p| !p.is_empty()).collect();
    match parts.len() {
        1 => Ok((None, parts[0].to_string())),
        2 => Ok((Some(parts[0].to_string()), parts[1].to_string())),
        3 => Ok((Some(parts[1].to_string()), parts[2].to_string())),
        _ => Err(CdcError::Parse(format!("cannot resolve a table name from id {id:?}"))),
    }
}

/// Splits the *original* source id into `(db, schema, table)` components
/// used as the basis for type-mapping and name-remap lookup keys (always
/// keyed on the source side, never the destination side).
pub fn split_source_id(id: &str) -> Result<(String, Option<String>, String), CdcError> {
    let parts: Vec<&str> = id.split('.').filter(|p| !p.is_empty()).collect();
    match parts.len() {
        1 => Ok((String::new(), None, parts[0].to_string())),
        2 => Ok((parts[0].to_string(), None, parts[1].to_string())),
        3 => Ok((parts[0].to_string(), Some(parts[1].to_string()), parts[2].to_string())),
        _ => Err(CdcError::Parse(format!("cannot resolve a table name from id {id:?}"))),
    }
}

pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub fn qualified_table(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(s) => format!("{}.{}", quote_ident(s), quote_ident(table)),
        None => quote_ident(table),
    }
}
