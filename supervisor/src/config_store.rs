//! A TOML-backed store for connector configs and their object-map rule
//! overrides, round-tripped the way the teacher's own `read_config` does
//! (§10.6). Backs the six config-mutating admin verbs: `add_conninfo`,
//! `delete_conninfo`, `add_objmap`, `delete_objmap`, `add_extra_conninfo`,
//! `delete_extra_conninfo`.

use std::path::PathBuf;

use common::config::{read_config, AppConfig, ConnectorConfig};
use common::err::CdcError;
use rules::rulefile::{load_rule_file, ObjectNameRule, RuleFile};

pub struct ConnectorConfigStore {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConnectorConfigStore {
    pub fn load(config_path: impl Into<PathBuf>) -> Result<Self, CdcError> {
        let config_path = config_path.into();
        let config = read_config(&config_path)?;
        Ok(Self { config_path, config })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn connector(&self, name: &str) -> Option<&ConnectorConfig> {
        self.config.connector(name)
    }

    fn connector_mut(&mut self, name: &str) -> Result<&mut ConnectorConfig, CdcError> {
        self.config
            .connectors
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| CdcError::Config(format!("no connector named {name}")))
    }

    fn persist(&self) -> Result<(), CdcError> {
        let text = toml::to_string_pretty(&self.config).map_err(|e| CdcError::Config(format!("serializing config: {e}")))?;
        std::fs::write(&self.config_path, text).map_err(|e| CdcError::Config(format!("writing config file: {e}")))
    }

    /// `add_conninfo` — sets the connector's primary connection parameters.
    pub fn add_conninfo(&mut self, name: &str, host: &str, port: u16, user: &str, credential: &str) -> Result<(), CdcError> {
        {
            let connector = self.connector_mut(name)?;
            connector.host = host.to_string();
            connector.port = port;
            connector.user = user.to_string();
            connector.credential = credential.to_string();
        }
        self.persist()
    }

    /// `delete_conninfo` — clears the connector's primary connection
    /// parameters back to empty; the connector cannot be started again
    /// until `add_conninfo` is called.
    pub fn delete_conninfo(&mut self, name: &str) -> Result<(), CdcError> {
        {
            let connector = self.connector_mut(name)?;
            connector.host.clear();
            connector.port = 0;
            connector.user.clear();
            connector.credential.clear();
        }
        self.persist()
    }

    pub fn add_extra_conninfo(&mut self, name: &str, key: &str, value: &str) -> Result<(), CdcError> {
        {
            let connector = self.connector_mut(name)?;
            connector.extra_conninfo.insert(key.to_string(), value.to_string());
        }
        self.persist()
    }

    pub fn delete_extra_conninfo(&mut self, name: &str, key: &str) -> Result<(), CdcError> {
        {
            let connector = self.connector_mut(name)?;
            connector.extra_conninfo.remove(key);
        }
        self.persist()
    }

    /// `add_objmap` — appends an object-name remap rule to the connector's
    /// rules file (creating it with empty datatype/expression arrays if it
    /// does not exist yet).
    pub fn add_objmap(&mut self, name: &str, object_type: &str, source_object: &str, destination_object: &str) -> Result<(), CdcError> {
        let rules_path = self.rules_path_for(name)?;
        let mut rule_file = load_or_default(&rules_path)?;
        rule_file.transform_objectname_rules.retain(|r| r.source_object != source_object);
        rule_file.transform_objectname_rules.push(ObjectNameRule {
            object_type: object_type.to_string(),
            source_object: source_object.to_string(),
            destination_object: destination_object.to_string(),
        });
        persist_rule_file(&rules_path, &rule_file)
    }

    pub fn delete_objmap(&mut self, name: &str, source_object: &str) -> Result<(), CdcError> {
        let rules_path = self.rules_path_for(name)?;
        let mut rule_file = load_or_default(&rules_path)?;
        rule_file.transform_objectname_rules.retain(|r| r.source_object != source_object);
        persist_rule_file(&rules_path, &rule_file)
    }

    fn rules_path_for(&mut self, name: &str) -> Result<PathBuf, CdcError> {
        if self.config.connector(name).is_none() {
            return Err(CdcError::Config(format!("no connector named {name}")));
        }
        match &self.config.rules_file {
            Some(path) => Ok(PathBuf::from(path)),
            None => {
                let path = default_rules_path(&self.config.metadata_dir, name);
                self.config.rules_file = Some(path.to_string_lossy().into_owned());
                self.persist()?;
                Ok(path)
            }
        }
    }
}

fn default_rules_path(metadata_dir: &str, name: &str) -> PathBuf {
    PathBuf::from(metadata_dir).join(format!("{name}_rules.json"))
}

fn load_or_default(path: &PathBuf) -> Result<RuleFile, CdcError> {
    if path.exists() {
        load_rule_file(path)
    } else {
        Ok(RuleFile::default())
    }
}

fn persist_rule_file(path: &PathBuf, rule_file: &RuleFile) -> Result<(), CdcError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CdcError::Config(format!("creating rules directory: {e}")))?;
    }
    let text = serde_json::to_string_pretty(rule_file).map_err(|e| CdcError::Config(format!("serializing rule file: {e}")))?;
    std::fs::write(path, text).map_err(|e| CdcError::Config(format!("writing rule file: {e}")))
}
