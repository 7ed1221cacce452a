use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::connector::ConnectorConfig;
use crate::err::CdcError;

/// Which of the two DML emission modes the DML Translator produces by
/// default. Both modes are always implemented; this only picks the
/// default used when a connector does not override it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionMode {
    Sql,
    Tuple,
}

/// Per-event failure handling strategy (rules file / app config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStrategy {
    SkipOnError,
    ExitOnError,
    RetryOnError,
}

impl Default for ErrorStrategy {
    fn default() -> Self {
        ErrorStrategy::SkipOnError
    }
}

/// Connection parameters for the destination engine (PostgreSQL, in this
/// implementation's concrete `applier` binding).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub credential: String,
    pub dbname: String,
}

fn default_nap_interval_secs() -> u64 {
    5
}

fn default_metadata_dir() -> String {
    "/tmp/cdc-ingest/metadata".to_string()
}

fn default_admin_bind_addr() -> String {
    "127.0.0.1:8089".to_string()
}

/// The top-level application configuration, loaded from a single TOML file
/// and combined with CLI overrides before the supervisor tasks are spawned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub connectors: Vec<ConnectorConfig>,

    pub destination: DestinationConfig,

    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: String,

    /// Path to the JSON rule file (§6 "Rule file format"); `None` means no
    /// user overrides, only the compiled-in defaults apply.
    #[serde(default)]
    pub rules_file: Option<String>,

    #[serde(default)]
    pub emission_mode: DefaultEmissionMode,

    #[serde(default)]
    pub error_strategy: ErrorStrategy,

    #[serde(default = "default_nap_interval_secs")]
    pub nap_interval_secs: u64,

    #[serde(default = "default_admin_bind_addr")]
    pub admin_bind_addr: String,
}

/// Wrapper so `#[serde(default)]` can supply `EmissionMode::Tuple` (the
/// spec's documented default) without requiring callers to write
/// `Default for EmissionMode` themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultEmissionMode(pub EmissionMode);

impl Default for DefaultEmissionMode {
    fn default() -> Self {
        DefaultEmissionMode(EmissionMode::Tuple)
    }
}

impl AppConfig {
    pub fn connector(&self, name: &str) -> Option<&ConnectorConfig> {
        self.connectors.iter().find(|c| c.name == name)
    }
}

/// Reads and parses the application configuration file.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, CdcError> {
    let text = fs::read_to_string(path.as_ref())
        .map_err(|e| CdcError::Config(format!("reading config file: {}", e)))?;

    toml::from_str(&text).map_err(|e| CdcError::Config(format!("parsing config file: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let toml_text = r#"
            metadata_dir = "/tmp/x"

            [destination]
            host = "localhost"
            port = 5432
            user = "postgres"
            credential = "postgres"
            dbname = "inv"

            [[connectors]]
            name = "inv"
            source_flavor = "my_sql"
            host = "127.0.0.1"
            port = 3306
            user = "root"
            credential = "secret"
            source_database = "inv"
            destination_database = "inv"
        "#;

        let cfg: AppConfig = toml::from_str(toml_text).expect("config should parse");
        assert_eq!(cfg.connectors.len(), 1);
        assert_eq!(cfg.connectors[0].name, "inv");
        assert_eq!(cfg.emission_mode.0, EmissionMode::Tuple);
        assert_eq!(cfg.error_strategy, ErrorStrategy::SkipOnError);
    }
}
