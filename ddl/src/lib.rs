//! Component D: the DDL Translator (§4.D).

pub mod envelope;
pub mod fqid;
pub mod translate;

pub use envelope::{ChangeKind, ColumnDescriptor, TableChange};
pub use translate::translate_ddl;
