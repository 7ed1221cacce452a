pub mod state;
pub mod stats;
pub mod time_rep;

pub use state::{ConnectorStage, ConnectorState};
pub use stats::{BatchLatency, DmlKind, Stats};
pub use time_rep::TimeRep;
