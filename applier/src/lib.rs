//! Component F: the Destination Applier.
//!
//! Concrete binding for this implementation: PostgreSQL reached over
//! `tokio-postgres`, not an in-process Postgres extension (§4.F, §9). SQL
//! mode executes the already-rendered statement text; tuple mode binds
//! the translator's positional `ColumnValue`s as typed parameters with an
//! explicit `$n::typename` cast per column, so the server resolves the
//! target type the way the spec's typed heap-tuple insert would.

use async_trait::async_trait;
use dml::{ColumnValue, DmlTuple, Emission};
use tokio_postgres::types::ToSql;
use tokio_postgres::Client;

use common::err::CdcError;
use dml::DmlOp;

/// Outcome of one `apply_dml` call. `NotFound` mirrors §4.F's "tuple to
/// update/delete not found" non-fatal event — the statement ran cleanly,
/// it simply matched no destination row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlOutcome {
    Applied,
    NotFound,
}

/// The destination-facing half of component F, behind a trait so the
/// supervisor loop can be exercised against an in-memory `FakeDestination`
/// in tests without a live PostgreSQL instance.
#[async_trait]
pub trait Destination: Send {
    async fn apply_ddl(&mut self, statement_text: &str) -> Result<(), CdcError>;

    async fn apply_dml(&mut self, emission: &Emission) -> Result<DmlOutcome, CdcError>;
}

/// The real binding: a `tokio-postgres` client session (§4.F/§9).
pub struct PostgresDestination {
    client: Client,
}

impl PostgresDestination {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Destination for PostgresDestination {
    async fn apply_ddl(&mut self, statement_text: &str) -> Result<(), CdcError> {
        apply_ddl(&mut self.client, statement_text).await
    }

    async fn apply_dml(&mut self, emission: &Emission) -> Result<DmlOutcome, CdcError> {
        apply_dml(&mut self.client, emission).await
    }
}

/// Runs `statement_text` (one or more `;`-separated DDL statements) in its
/// own transaction. On failure the transaction is left to roll back via
/// `Drop` and the error is prefixed for debuggability.
pub async fn apply_ddl(client: &mut Client, statement_text: &str) -> Result<(), CdcError> {
    let txn = client
        .transaction()
        .await
        .map_err(|e| CdcError::Apply(format!("beginning ddl transaction: {e}")))?;

    txn.batch_execute(statement_text)
        .await
        .map_err(|e| CdcError::Apply(format!("applying ddl {statement_text:?}: {e}")))?;

    txn.commit().await.map_err(|e| CdcError::Apply(format!("committing ddl transaction: {e}")))?;
    Ok(())
}

/// Runs one translated DML record in its own transaction: a single
/// rendered statement in SQL mode, a cast-and-bind statement built from
/// the positional tuple in tuple mode.
pub async fn apply_dml(client: &mut Client, emission: &Emission) -> Result<DmlOutcome, CdcError> {
    match emission {
        Emission::Sql(sql) => apply_sql(client, sql).await,
        Emission::Tuple(tuple) => apply_tuple(client, tuple).await,
    }
}

async fn apply_sql(client: &mut Client, sql: &str) -> Result<DmlOutcome, CdcError> {
    let txn = client
        .transaction()
        .await
        .map_err(|e| CdcError::Apply(format!("beginning dml transaction: {e}")))?;

    let affected = txn
        .execute(sql, &[])
        .await
        .map_err(|e| CdcError::Apply(format!("applying dml {sql:?}: {e}")))?;

    txn.commit().await.map_err(|e| CdcError::Apply(format!("committing dml transaction: {e}")))?;
    Ok(if affected == 0 { DmlOutcome::NotFound } else { DmlOutcome::Applied })
}

async fn apply_tuple(client: &mut Client, tuple: &DmlTuple) -> Result<DmlOutcome, CdcError> {
    let txn = client
        .transaction()
        .await
        .map_err(|e| prefixed(tuple.table_oid, format!("beginning dml transaction: {e}")))?;

    let result = match tuple.op {
        DmlOp::Read | DmlOp::Insert => tuple_insert(&txn, tuple).await,
        DmlOp::Update => tuple_update(&txn, tuple).await,
        DmlOp::Delete => tuple_delete(&txn, tuple).await,
    };

    match result {
        Ok(outcome) => {
            txn.commit()
                .await
                .map_err(|e| prefixed(tuple.table_oid, format!("committing dml transaction: {e}")))?;
            Ok(outcome)
        }
        Err(e) => Err(e),
    }
}

async fn tuple_insert(txn: &tokio_postgres::Transaction<'_>, tuple: &DmlTuple) -> Result<DmlOutcome, CdcError> {
    let qualified = ddl::fqid::qualified_table(Some(&tuple.schema), &tuple.table);
    let mut columns = Vec::with_capacity(tuple.after.len());
    let mut placeholders = Vec::with_capacity(tuple.after.len());
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(tuple.after.len());
    let mut owned: Vec<Option<String>> = Vec::with_capacity(tuple.after.len());

    for col in &tuple.after {
        columns.push(ddl::fqid::quote_ident(&col.dest_name));
        owned.push(bind_value(col.value.as_deref(), catalog::type_name_for_oid(col.oid)));
    }
    for (i, col) in tuple.after.iter().enumerate() {
        placeholders.push(format!("${}::{}", i + 1, catalog::type_name_for_oid(col.oid)));
    }
    for value in &owned {
        params.push(value as &(dyn ToSql + Sync));
    }

    let sql = format!(
        "INSERT INTO {qualified} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );
    let affected = txn
        .execute(sql.as_str(), &params)
        .await
        .map_err(|e| prefixed(tuple.table_oid, format!("tuple insert into {qualified}: {e}")))?;
    Ok(if affected == 0 { DmlOutcome::NotFound } else { DmlOutcome::Applied })
}

async fn tuple_update(txn: &tokio_postgres::Transaction<'_>, tuple: &DmlTuple) -> Result<DmlOutcome, CdcError> {
    let qualified = ddl::fqid::qualified_table(Some(&tuple.schema), &tuple.table);

    let mut set_clauses = Vec::with_capacity(tuple.after.len());
    let mut owned: Vec<Option<String>> = Vec::with_capacity(tuple.after.len() + tuple.before.len());
    for col in &tuple.after {
        owned.push(bind_value(col.value.as_deref(), catalog::type_name_for_oid(col.oid)));
        set_clauses.push(format!(
            "{} = ${}::{}",
            ddl::fqid::quote_ident(&col.dest_name),
            owned.len(),
            catalog::type_name_for_oid(col.oid)
        ));
    }

    let locate = locate_columns(&tuple.before, &tuple.primary_key);
    let mut where_clauses = Vec::with_capacity(locate.len());
    for col in locate {
        owned.push(bind_value(col.value.as_deref(), catalog::type_name_for_oid(col.oid)));
        where_clauses.push(format!(
            "{} = ${}::{}",
            ddl::fqid::quote_ident(&col.dest_name),
            owned.len(),
            catalog::type_name_for_oid(col.oid)
        ));
    }

    let params: Vec<&(dyn ToSql + Sync)> = owned.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
    let sql = format!("UPDATE {qualified} SET {} WHERE {}", set_clauses.join(", "), where_clauses.join(" AND "));
    let affected = txn
        .execute(sql.as_str(), &params)
        .await
        .map_err(|e| prefixed(tuple.table_oid, format!("tuple update on {qualified}: {e}")))?;
    Ok(if affected == 0 { DmlOutcome::NotFound } else { DmlOutcome::Applied })
}

async fn tuple_delete(txn: &tokio_postgres::Transaction<'_>, tuple: &DmlTuple) -> Result<DmlOutcome, CdcError> {
    let qualified = ddl::fqid::qualified_table(Some(&tuple.schema), &tuple.table);

    let locate = locate_columns(&tuple.before, &tuple.primary_key);
    let mut owned: Vec<Option<String>> = Vec::with_capacity(locate.len());
    let mut where_clauses = Vec::with_capacity(locate.len());
    for col in locate {
        owned.push(bind_value(col.value.as_deref(), catalog::type_name_for_oid(col.oid)));
        where_clauses.push(format!(
            "{} = ${}::{}",
            ddl::fqid::quote_ident(&col.dest_name),
            owned.len(),
            catalog::type_name_for_oid(col.oid)
        ));
    }

    let params: Vec<&(dyn ToSql + Sync)> = owned.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
    let sql = format!("DELETE FROM {qualified} WHERE {}", where_clauses.join(" AND "));
    let affected = txn
        .execute(sql.as_str(), &params)
        .await
        .map_err(|e| prefixed(tuple.table_oid, format!("tuple delete on {qualified}: {e}")))?;
    Ok(if affected == 0 { DmlOutcome::NotFound } else { DmlOutcome::Applied })
}

/// Locates the row by primary key when one is declared (letting the
/// destination planner use its index), falling back to the full
/// before-image (an effective sequential scan) otherwise — §4.F's
/// "locate by primary-key index if one exists, else sequential scan".
fn locate_columns<'a>(before: &'a [ColumnValue], primary_key: &[String]) -> Vec<&'a ColumnValue> {
    if primary_key.is_empty() {
        before.iter().collect()
    } else {
        before.iter().filter(|c| primary_key.contains(&c.dest_name)).collect()
    }
}

fn prefixed(table_oid: u32, message: String) -> CdcError {
    CdcError::Apply(format!("[table {table_oid}] {message}"))
}

/// Carries a column's text value in the form its destination type needs
/// for a `$n::type_name` cast bind. Every tuple-mode value binds as text,
/// so a bytea column needs the `\x` hex-escape prefix SQL mode already
/// adds via `bytea::sql_literal` — a prefix-less hex string casts to
/// Postgres' legacy escape format, not hex, and decodes to the wrong
/// bytes entirely.
fn bind_value(value: Option<&str>, type_name: &str) -> Option<String> {
    match value {
        Some(v) if type_name == "bytea" => Some(format!("\\x{v}")),
        Some(v) => Some(v.to_string()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dml::ColumnValue;

    fn column(name: &str, value: Option<&str>, oid: u32) -> ColumnValue {
        ColumnValue { dest_name: name.to_string(), position: 0, oid, typemod: -1, value: value.map(String::from) }
    }

    #[test]
    fn locate_columns_prefers_primary_key() {
        let before = vec![column("id", Some("1"), 23), column("amount", Some("9"), 1700)];
        let located = locate_columns(&before, &["id".to_string()]);
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].dest_name, "id");
    }

    #[test]
    fn locate_columns_falls_back_to_full_before_image() {
        let before = vec![column("id", Some("1"), 23), column("amount", Some("9"), 1700)];
        let located = locate_columns(&before, &[]);
        assert_eq!(located.len(), 2);
    }

    #[test]
    fn prefixed_error_carries_table_oid() {
        let e = prefixed(16400, "boom".to_string());
        assert!(e.to_string().contains("[table 16400]"));
    }

    #[test]
    fn bind_value_adds_hex_escape_prefix_for_bytea() {
        assert_eq!(bind_value(Some("DEADBEEF"), "bytea"), Some("\\xDEADBEEF".to_string()));
    }

    #[test]
    fn bind_value_passes_other_types_through_unprefixed() {
        assert_eq!(bind_value(Some("42"), "int4"), Some("42".to_string()));
    }

    #[test]
    fn bind_value_preserves_null() {
        assert_eq!(bind_value(None, "bytea"), None);
    }
}
