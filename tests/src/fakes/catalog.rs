//! `FakeCatalog`: an in-memory `catalog::CatalogResolver` pre-seeded with
//! the table entries a scenario needs, so the DDL/DML translators and the
//! supervisor loop can be driven without a live destination database.

use std::collections::HashMap;

use async_trait::async_trait;
use catalog::{CatalogResolver, TableEntry};
use common::err::CdcError;

#[derive(Default)]
pub struct FakeCatalog {
    namespaces: HashMap<String, u32>,
    tables: HashMap<(String, String), TableEntry>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, schema: &str, oid: u32) -> Self {
        self.namespaces.insert(schema.to_ascii_lowercase(), oid);
        self
    }

    pub fn with_table(mut self, schema: &str, table: &str, entry: TableEntry) -> Self {
        self.tables.insert((schema.to_ascii_lowercase(), table.to_ascii_lowercase()), entry);
        self
    }
}

#[async_trait]
impl CatalogResolver for FakeCatalog {
    async fn get_namespace_oid(&self, schema: &str) -> Result<Option<u32>, CdcError> {
        Ok(self.namespaces.get(&schema.to_ascii_lowercase()).copied())
    }

    async fn get_table_oid(&self, schema: &str, table: &str) -> Result<Option<u32>, CdcError> {
        Ok(self
            .tables
            .get(&(schema.to_ascii_lowercase(), table.to_ascii_lowercase()))
            .map(|e| e.table_oid))
    }

    async fn fetch_table_entry(&self, schema: &str, table: &str) -> Result<TableEntry, CdcError> {
        self.tables
            .get(&(schema.to_ascii_lowercase(), table.to_ascii_lowercase()))
            .cloned()
            .ok_or_else(|| CdcError::Catalog(format!("destination table {schema}.{table} does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::ColumnEntry;

    fn orders_entry() -> TableEntry {
        TableEntry {
            table_oid: 16400,
            columns: HashMap::from([("id".to_string(), ColumnEntry { oid: 23, position: 0, typemod: -1 })]),
            primary_key: vec!["id".to_string()],
        }
    }

    #[tokio::test]
    async fn fetch_table_entry_returns_the_seeded_entry() {
        let catalog = FakeCatalog::new().with_table("public", "orders", orders_entry());
        let entry = catalog.fetch_table_entry("PUBLIC", "Orders").await.unwrap();
        assert_eq!(entry.table_oid, 16400);
    }

    #[tokio::test]
    async fn fetch_table_entry_errors_on_an_unseeded_table() {
        let catalog = FakeCatalog::new();
        assert!(catalog.fetch_table_entry("public", "orders").await.is_err());
    }
}
