//! The DataCache: destination table/column metadata, memoized per
//! `{schema, table}` and invalidated whenever a DDL touches that table.

use std::collections::HashMap;

/// One resolved destination column: its type oid, 0-based attribute
/// position, and declared typemod (-1 when the type carries none).
#[derive(Debug, Clone, Copy)]
pub struct ColumnEntry {
    pub oid: u32,
    pub position: i32,
    pub typemod: i32,
}

#[derive(Debug, Clone)]
pub struct TableEntry {
    pub table_oid: u32,
    pub columns: HashMap<String, ColumnEntry>,
    /// Destination-side primary key column names, in declared order.
    /// Empty when the table has no primary key.
    pub primary_key: Vec<String>,
}

impl TableEntry {
    pub fn column(&self, name: &str) -> Option<&ColumnEntry> {
        self.columns.get(name)
    }
}

#[derive(Debug, Default)]
pub struct DataCache {
    entries: HashMap<(String, String), TableEntry>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(schema: &str, table: &str) -> (String, String) {
        (schema.to_ascii_lowercase(), table.to_ascii_lowercase())
    }

    pub fn get(&self, schema: &str, table: &str) -> Option<&TableEntry> {
        self.entries.get(&Self::key(schema, table))
    }

    pub fn insert(&mut self, schema: &str, table: &str, entry: TableEntry) {
        self.entries.insert(Self::key(schema, table), entry);
    }

    /// DDL on `(schema, table)` invalidates any memoized catalog entry for
    /// it; the next DML or ALTER against that table repopulates it lazily.
    pub fn invalidate(&mut self, schema: &str, table: &str) {
        self.entries.remove(&Self::key(schema, table));
    }
}
