use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The upstream relational engine a connector captures from. Drives which
/// default type-mapping table the Type-Mapping Registry loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFlavor {
    MySql,
    SqlServer,
    Oracle,
}

impl fmt::Display for SourceFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceFlavor::MySql => "mysql",
            SourceFlavor::SqlServer => "sql_server",
            SourceFlavor::Oracle => "oracle",
        };
        write!(f, "{}", s)
    }
}

/// The producer-controlled policy governing whether the upstream replays
/// historical rows before streaming live changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotMode {
    Initial,
    InitialOnly,
    Never,
    NoData,
    Always,
    Schemasync,
}

/// Immutable per-connector descriptor, loaded from the connectors array of
/// the application configuration file and never mutated while a supervisor
/// task owns it.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub name: String,
    pub source_flavor: SourceFlavor,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub credential: String,
    pub source_database: String,
    pub destination_database: String,
    #[serde(default)]
    pub table_include_list: Vec<String>,
    #[serde(default = "default_snapshot_mode")]
    pub snapshot_mode: SnapshotMode,

    /// Argv of the embedded-runner subprocess `ProcessProducer` spawns for
    /// this connector (the Debezium-style runner itself is out of scope;
    /// see §9's "JVM-embedded producer" design note). Empty is rejected at
    /// producer start, not at config-parse time.
    #[serde(default)]
    pub producer_command: Vec<String>,

    /// Secondary connection parameters the admin `add_extra_conninfo` /
    /// `delete_extra_conninfo` verbs manage (e.g. a replica fallback host);
    /// not read by the translator/applier path itself.
    #[serde(default)]
    pub extra_conninfo: HashMap<String, String>,
}

fn default_snapshot_mode() -> SnapshotMode {
    SnapshotMode::Initial
}

impl ConnectorConfig {
    /// True when every table of the source database is included (an empty
    /// include list means "all").
    pub fn includes_all_tables(&self) -> bool {
        self.table_include_list.is_empty()
    }

    pub fn includes_table(&self, fq_table: &str) -> bool {
        self.includes_all_tables() || self.table_include_list.iter().any(|t| t == fq_table)
    }
}

/// Masks the credential so it never lands in a log line via `{:?}`.
impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("name", &self.name)
            .field("source_flavor", &self.source_flavor)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("credential", &mask_credential(&self.credential))
            .field("source_database", &self.source_database)
            .field("destination_database", &self.destination_database)
            .field("table_include_list", &self.table_include_list)
            .field("snapshot_mode", &self.snapshot_mode)
            .field("extra_conninfo", &self.extra_conninfo.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn mask_credential(s: &str) -> String {
    match s.len() {
        0 => String::new(),
        1 => "*".to_string(),
        len => format!("{}{}{}", &s[..1], "*".repeat(len.saturating_sub(2)), &s[len - 1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConnectorConfig {
        ConnectorConfig {
            name: "inv".into(),
            source_flavor: SourceFlavor::MySql,
            host: "127.0.0.1".into(),
            port: 3306,
            user: "root".into(),
            credential: "hunter2".into(),
            source_database: "inv".into(),
            destination_database: "inv".into(),
            table_include_list: vec![],
            snapshot_mode: SnapshotMode::Initial,
            producer_command: vec!["debezium-embedded-runner".to_string()],
            extra_conninfo: HashMap::new(),
        }
    }

    #[test]
    fn empty_include_list_means_all_tables() {
        let c = sample();
        assert!(c.includes_all_tables());
        assert!(c.includes_table("inv.orders"));
    }

    #[test]
    fn explicit_include_list_is_exact() {
        let mut c = sample();
        c.table_include_list = vec!["inv.orders".to_string()];
        assert!(c.includes_table("inv.orders"));
        assert!(!c.includes_table("inv.customers"));
    }

    #[test]
    fn credential_is_masked_in_debug_output() {
        let c = sample();
        let rendered = format!("{:?}", c);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("h*****2"));
    }
}
