pub mod connector;
pub mod runtime;

pub use connector::{ConnectorConfig, SnapshotMode, SourceFlavor};
pub use runtime::{read_config, AppConfig, DefaultEmissionMode, DestinationConfig, EmissionMode, ErrorStrategy};
