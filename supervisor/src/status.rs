//! Component H: the Shared Status Surface. A `dashmap::DashMap` of
//! per-connector slots, each guarded by its own `tokio::sync::RwLock` so a
//! status read can be held safely across an `.await` while no mutation
//! ever is (§5's concurrency model).

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use common::err::CdcError;
use common::model::{ConnectorStage, ConnectorState, Stats};

/// Destination-error messages are capped at this many bytes before being
/// stored, per §4.F.
pub const ERROR_BUFFER_CAP: usize = 256;

/// One connector's externally-observable status, returned by `get_status`
/// as an owned snapshot (never a reference into the table).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedStatus {
    pub state: ConnectorState,
    pub stage: ConnectorStage,
    pub pid: Option<u32>,
    pub error: String,
    pub source_database: String,
    pub destination_database: String,
    pub stats: Stats,
    pub last_offset: String,
}

impl SharedStatus {
    pub fn set_error(&mut self, message: impl Into<String>) {
        let mut text = message.into();
        if text.len() > ERROR_BUFFER_CAP {
            text.truncate(ERROR_BUFFER_CAP);
        }
        self.error = text;
    }

    pub fn clear_error(&mut self) {
        self.error.clear();
    }
}

/// The three request kinds §4.G allows to be posted into a connector's
/// single request slot. Only `Paused -> Syncing`, `Syncing -> Paused` and
/// `Paused -> OffsetUpdate` are accepted (`ConnectorState::accepts_request`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Pause,
    Resume,
    OffsetUpdate,
}

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub kind: RequestKind,
    pub offset: Option<String>,
    pub file: Option<String>,
}

#[derive(Default)]
struct Entry {
    status: SharedStatus,
    pending_request: Option<PendingRequest>,
}

/// Process-wide singleton, constructed once in `main` and cloned (as an
/// `Arc`) into every supervisor task and into the admin HTTP surface.
pub struct SharedStatusTable {
    entries: DashMap<String, RwLock<Entry>>,
}

impl SharedStatusTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { entries: DashMap::new() })
    }

    /// Creates the slot for `name` if it does not already exist. Called
    /// once by a supervisor task before it starts mutating its own status.
    pub fn ensure(&self, name: &str) {
        self.entries.entry(name.to_string()).or_insert_with(|| RwLock::new(Entry::default()));
    }

    pub async fn get_status(&self, name: &str) -> Option<SharedStatus> {
        let entry = self.entries.get(name)?;
        let guard = entry.read().await;
        Some(guard.status.clone())
    }

    pub fn connector_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    async fn with_status_mut<F: FnOnce(&mut SharedStatus)>(&self, name: &str, f: F) -> Result<(), CdcError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| CdcError::Internal(format!("no shared-status slot for connector {name}")))?;
        let mut guard = entry.write().await;
        f(&mut guard.status);
        Ok(())
    }

    pub async fn set_state(&self, name: &str, state: ConnectorState) -> Result<(), CdcError> {
        self.with_status_mut(name, |s| s.state = state).await
    }

    pub async fn set_stage(&self, name: &str, stage: ConnectorStage) -> Result<(), CdcError> {
        self.with_status_mut(name, |s| s.stage = stage).await
    }

    pub async fn set_pid(&self, name: &str, pid: Option<u32>) -> Result<(), CdcError> {
        self.with_status_mut(name, |s| s.pid = pid).await
    }

    pub async fn set_error(&self, name: &str, message: impl Into<String>) -> Result<(), CdcError> {
        let message = message.into();
        self.with_status_mut(name, move |s| s.set_error(message)).await
    }

    pub async fn clear_error(&self, name: &str) -> Result<(), CdcError> {
        self.with_status_mut(name, |s| s.clear_error()).await
    }

    pub async fn set_databases(&self, name: &str, source: &str, destination: &str) -> Result<(), CdcError> {
        let source = source.to_string();
        let destination = destination.to_string();
        self.with_status_mut(name, move |s| {
            s.source_database = source;
            s.destination_database = destination;
        })
        .await
    }

    pub async fn set_offset(&self, name: &str, offset: &str) -> Result<(), CdcError> {
        let offset = offset.to_string();
        self.with_status_mut(name, move |s| s.last_offset = offset).await
    }

    pub async fn update_stats<F: FnOnce(&mut Stats)>(&self, name: &str, f: F) -> Result<(), CdcError> {
        self.with_status_mut(name, move |s| f(&mut s.stats)).await
    }

    /// Posts a request into `name`'s single request slot. Rejects if the
    /// slot is already occupied, or if the requested transition is not one
    /// of the three §4.G allows from the connector's current state.
    pub async fn post_request(
        &self,
        name: &str,
        kind: RequestKind,
        offset: Option<String>,
        file: Option<String>,
    ) -> Result<(), CdcError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| CdcError::Internal(format!("no shared-status slot for connector {name}")))?;
        let mut guard = entry.write().await;

        if guard.pending_request.is_some() {
            return Err(CdcError::Internal(format!("connector {name} already has a pending request")));
        }

        let target = match kind {
            RequestKind::Pause => ConnectorState::Paused,
            RequestKind::Resume => ConnectorState::Syncing,
            RequestKind::OffsetUpdate => ConnectorState::OffsetUpdate,
        };
        if !guard.status.state.accepts_request(target) {
            return Err(CdcError::Internal(format!(
                "connector {name} cannot accept a {kind:?} request while {:?}",
                guard.status.state
            )));
        }

        guard.pending_request = Some(PendingRequest { kind, offset, file });
        Ok(())
    }

    /// Drains the pending request, if any, for the supervisor loop to
    /// handle this iteration. The slot is always cleared by this call.
    pub async fn take_request(&self, name: &str) -> Option<PendingRequest> {
        let entry = self.entries.get(name)?;
        let mut guard = entry.write().await;
        guard.pending_request.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn post_request_rejects_a_second_pending_request() {
        let table = SharedStatusTable::new();
        table.ensure("inv");
        table.set_state("inv", ConnectorState::Syncing).await.unwrap();
        table.post_request("inv", RequestKind::Pause, None, None).await.unwrap();
        assert!(table.post_request("inv", RequestKind::Pause, None, None).await.is_err());
    }

    #[tokio::test]
    async fn post_request_rejects_an_unsupported_transition() {
        let table = SharedStatusTable::new();
        table.ensure("inv");
        table.set_state("inv", ConnectorState::Stopped).await.unwrap();
        assert!(table.post_request("inv", RequestKind::Resume, None, None).await.is_err());
    }

    #[tokio::test]
    async fn take_request_drains_the_slot() {
        let table = SharedStatusTable::new();
        table.ensure("inv");
        table.set_state("inv", ConnectorState::Syncing).await.unwrap();
        table.post_request("inv", RequestKind::Pause, None, None).await.unwrap();
        assert!(table.take_request("inv").await.is_some());
        assert!(table.take_request("inv").await.is_none());
    }

    #[test]
    fn error_message_is_capped() {
        let mut s = SharedStatus::default();
        s.set_error("x".repeat(300));
        assert_eq!(s.error.len(), ERROR_BUFFER_CAP);
    }
}
