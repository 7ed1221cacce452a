//! The DataCache and the catalog-resolution interface it is populated
//! from (§3, §4.E, §4.F).

pub mod cache;
pub mod pgtype;
pub mod resolver;

pub use cache::{ColumnEntry, DataCache, TableEntry};
pub use pgtype::{class_for_oid, type_name_for_oid};
pub use resolver::{CatalogResolver, PostgresCatalog};
