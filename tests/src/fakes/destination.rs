//! `FakeDestination`: an in-memory `applier::Destination` stub (§10.4).
//! Records every applied DDL statement and DML emission, and can be told
//! to report every update/delete as a miss so the "tuple to update not
//! found" path (§8 scenario 5) can be exercised without a real table.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use applier::{Destination, DmlOutcome};
use common::err::CdcError;
use dml::{DmlOp, Emission};

#[derive(Debug, Default, Clone)]
pub struct Recorded {
    pub ddl: Vec<String>,
    pub dml: Vec<Emission>,
}

pub struct FakeDestination {
    recorded: Arc<Mutex<Recorded>>,
    miss_updates_and_deletes: bool,
}

impl FakeDestination {
    pub fn new() -> Self {
        Self { recorded: Arc::new(Mutex::new(Recorded::default())), miss_updates_and_deletes: false }
    }

    /// Every `Update`/`Delete` applied afterward reports `DmlOutcome::NotFound`
    /// instead of recording the row, simulating a destination table with no
    /// matching before-image.
    pub fn missing_rows(mut self) -> Self {
        self.miss_updates_and_deletes = true;
        self
    }

    /// A cheap handle sharing the same recorded state, for assertions made
    /// after the destination has been moved into a `Box<dyn Destination>`.
    pub fn handle(&self) -> Arc<Mutex<Recorded>> {
        self.recorded.clone()
    }
}

impl Default for FakeDestination {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Destination for FakeDestination {
    async fn apply_ddl(&mut self, statement_text: &str) -> Result<(), CdcError> {
        self.recorded.lock().await.ddl.push(statement_text.to_string());
        Ok(())
    }

    async fn apply_dml(&mut self, emission: &Emission) -> Result<DmlOutcome, CdcError> {
        let op = match emission {
            Emission::Sql(_) => None,
            Emission::Tuple(tuple) => Some(tuple.op),
        };
        if self.miss_updates_and_deletes && matches!(op, Some(DmlOp::Update) | Some(DmlOp::Delete)) {
            return Ok(DmlOutcome::NotFound);
        }
        self.recorded.lock().await.dml.push(emission.clone());
        Ok(DmlOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dml::{ColumnValue, DmlTuple};

    fn tuple(op: DmlOp) -> Emission {
        Emission::Tuple(DmlTuple {
            op,
            schema: "public".to_string(),
            table: "orders".to_string(),
            table_oid: 16400,
            primary_key: vec!["id".to_string()],
            before: vec![ColumnValue { dest_name: "id".to_string(), position: 0, oid: 23, typemod: -1, value: Some("1".to_string()) }],
            after: vec![],
        })
    }

    #[tokio::test]
    async fn applies_and_records_ddl() {
        let mut dest = FakeDestination::new();
        let handle = dest.handle();
        dest.apply_ddl("CREATE TABLE x (id int);").await.unwrap();
        assert_eq!(handle.lock().await.ddl.len(), 1);
    }

    #[tokio::test]
    async fn missing_rows_reports_not_found_for_update() {
        let mut dest = FakeDestination::new().missing_rows();
        let handle = dest.handle();
        let outcome = dest.apply_dml(&tuple(DmlOp::Update)).await.unwrap();
        assert_eq!(outcome, DmlOutcome::NotFound);
        assert!(handle.lock().await.dml.is_empty());
    }

    #[tokio::test]
    async fn insert_is_unaffected_by_missing_rows() {
        let mut dest = FakeDestination::new().missing_rows();
        let handle = dest.handle();
        let outcome = dest.apply_dml(&tuple(DmlOp::Insert)).await.unwrap();
        assert_eq!(outcome, DmlOutcome::Applied);
        assert_eq!(handle.lock().await.dml.len(), 1);
    }
}
