//! Catalog resolution: looks up destination namespace/table oids and the
//! column `{oid, position, typemod}` map a DataCache entry is built from.

use async_trait::async_trait;
use common::err::CdcError;

use crate::cache::{ColumnEntry, TableEntry};

/// The subset of a destination engine's catalog the DDL/DML translators
/// and the applier need: existence checks and the metadata a DataCache
/// entry is populated from. Implemented against PostgreSQL by
/// `PostgresCatalog`; a `FakeCatalog` in `tests` exercises callers
/// without a live database.
#[async_trait]
pub trait CatalogResolver: Send + Sync {
    async fn get_namespace_oid(&self, schema: &str) -> Result<Option<u32>, CdcError>;

    async fn get_table_oid(&self, schema: &str, table: &str) -> Result<Option<u32>, CdcError>;

    /// Fetches the full column map for a table already known to exist.
    async fn fetch_table_entry(&self, schema: &str, table: &str) -> Result<TableEntry, CdcError>;
}

pub use crate::cache::DataCache;

#[async_trait]
impl CatalogResolver for PostgresCatalog {
    async fn get_namespace_oid(&self, schema: &str) -> Result<Option<u32>, CdcError> {
        let row = self
            .client
            .query_opt(
                "select oid from pg_namespace where nspname = $1",
                &[&schema.to_ascii_lowercase()],
            )
            .await
            .map_err(|e| CdcError::Catalog(format!("namespace lookup for {schema}: {e}")))?;
        Ok(row.map(|r| r.get::<_, u32>(0)))
    }

    async fn get_table_oid(&self, schema: &str, table: &str) -> Result<Option<u32>, CdcError> {
        let row = self
            .client
            .query_opt(
                "select c.oid from pg_class c \
                 join pg_namespace n on n.oid = c.relnamespace \
                 where n.nspname = $1 and c.relname = $2",
                &[&schema.to_ascii_lowercase(), &table.to_ascii_lowercase()],
            )
            .await
            .map_err(|e| CdcError::Catalog(format!("table lookup for {schema}.{table}: {e}")))?;
        Ok(row.map(|r| r.get::<_, u32>(0)))
    }

    async fn fetch_table_entry(&self, schema: &str, table: &str) -> Result<TableEntry, CdcError> {
        let table_oid = self
            .get_table_oid(schema, table)
            .await?
            .ok_or_else(|| CdcError::Catalog(format!("destination table {schema}.{table} does not exist")))?;

        let rows = self
            .client
            .query(
                "select column_name, ordinal_position, udt_name, \
                 coalesce(character_maximum_length, numeric_precision, -1) as typemod \
                 from information_schema.columns \
                 where table_schema = $1 and table_name = $2",
                &[&schema.to_ascii_lowercase(), &table.to_ascii_lowercase()],
            )
            .await
            .map_err(|e| CdcError::Catalog(format!("column lookup for {schema}.{table}: {e}")))?;

        let mut columns = std::collections::HashMap::new();
        for row in rows {
            let name: String = row.get("column_name");
            let position: i32 = row.get::<_, i32>("ordinal_position") - 1;
            let typemod: i32 = row.get("typemod");
            let type_oid = self.pg_type_oid(&row.get::<_, String>("udt_name")).await?;
            columns.insert(name, ColumnEntry { oid: type_oid, position, typemod });
        }

        let pk_rows = self
            .client
            .query(
                "select kcu.column_name \
                 from information_schema.table_constraints tc \
                 join information_schema.key_column_usage kcu \
                   on tc.constraint_name = kcu.constraint_name and tc.table_schema = kcu.table_schema \
                 where tc.constraint_type = 'PRIMARY KEY' and tc.table_schema = $1 and tc.table_name = $2 \
                 order by kcu.ordinal_position",
                &[&schema.to_ascii_lowercase(), &table.to_ascii_lowercase()],
            )
            .await
            .map_err(|e| CdcError::Catalog(format!("primary key lookup for {schema}.{table}: {e}")))?;
        let primary_key = pk_rows.into_iter().map(|r| r.get::<_, String>("column_name")).collect();

        Ok(TableEntry { table_oid, columns, primary_key })
    }
}

pub struct PostgresCatalog {
    client: tokio_postgres::Client,
}

impl PostgresCatalog {
    pub fn new(client: tokio_postgres::Client) -> Self {
        Self { client }
    }

    async fn pg_type_oid(&self, udt_name: &str) -> Result<u32, CdcError> {
        let row = self
            .client
            .query_opt("select oid from pg_type where typname = $1", &[&udt_name])
            .await
            .map_err(|e| CdcError::Catalog(format!("type lookup for {udt_name}: {e}")))?;
        row.map(|r| r.get::<_, u32>(0))
            .ok_or_else(|| CdcError::Catalog(format!("unknown destination type: {udt_name}")))
    }
}
