//! Components G and H: the connector supervisor task loop, the shared
//! status surface, the config store, and the admin verb registry that
//! ties all three together for the CLI and the HTTP admin layer.

pub mod admin;
pub mod config_store;
pub mod run;
pub mod status;

pub use admin::SupervisorRegistry;
pub use config_store::ConnectorConfigStore;
pub use run::{run_connector, SupervisorConfig};
pub use status::{PendingRequest, RequestKind, SharedStatus, SharedStatusTable, ERROR_BUFFER_CAP};
