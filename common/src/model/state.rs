use serde::{Deserialize, Serialize};

/// The connector supervisor's state machine (§4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorState {
    Undef,
    Stopped,
    Initializing,
    Paused,
    Syncing,
    Parsing,
    Converting,
    Executing,
    OffsetUpdate,
    Restarting,
    SchemaSyncDone,
    ReloadObjmap,
}

impl Default for ConnectorState {
    fn default() -> Self {
        ConnectorState::Undef
    }
}

impl ConnectorState {
    /// Whether `to` is a transition the supervisor loop accepts from `self`
    /// when handling a *requested* (externally posted) transition. This
    /// governs only the `Paused`/`Syncing` request-driven arcs of §4.G;
    /// internal work transitions (`Syncing -> Parsing -> Converting ->
    /// Executing -> Syncing`) are driven by the loop itself, not requests.
    pub fn accepts_request(&self, to: ConnectorState) -> bool {
        matches!(
            (self, to),
            (ConnectorState::Paused, ConnectorState::Syncing)
                | (ConnectorState::Paused, ConnectorState::OffsetUpdate)
                | (ConnectorState::Syncing, ConnectorState::Paused)
        )
    }
}

/// Coarse-grained progress reported to external observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorStage {
    Undef,
    InitialSnapshot,
    ChangeDataCapture,
    SchemaSync,
}

impl Default for ConnectorStage {
    fn default() -> Self {
        ConnectorStage::Undef
    }
}
