//! The admin verb surface (§6/§10.5): the one place `start`, `stop`,
//! `pause`, `resume`, `set_offset` and the six config-mutating verbs are
//! wired together, shared verbatim by the CLI and the HTTP admin layer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

use catalog::{CatalogResolver, PostgresCatalog};
use common::config::{AppConfig, ConnectorConfig};
use common::err::CdcError;
use producer::{ProcessProducer, Producer};
use rules::RuleSet;

use crate::config_store::ConnectorConfigStore;
use crate::run::{run_connector, SupervisorConfig};
use crate::status::{RequestKind, SharedStatus, SharedStatusTable};

struct ConnectorHandle {
    join: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

/// Owns every running connector task plus the config store and shared
/// status table. One instance per process, shared behind an `Arc` between
/// the CLI dispatcher and the admin HTTP server.
pub struct SupervisorRegistry {
    status_table: Arc<SharedStatusTable>,
    config_store: Mutex<ConnectorConfigStore>,
    handles: Mutex<HashMap<String, ConnectorHandle>>,
}

impl SupervisorRegistry {
    pub fn new(config_store: ConnectorConfigStore) -> Arc<Self> {
        let status_table = SharedStatusTable::new();
        for connector in &config_store.config().connectors {
            status_table.ensure(&connector.name);
        }
        Arc::new(Self { status_table, config_store: Mutex::new(config_store), handles: Mutex::new(HashMap::new()) })
    }

    pub fn status_table(&self) -> Arc<SharedStatusTable> {
        self.status_table.clone()
    }

    pub fn connector_names(&self) -> Vec<String> {
        self.status_table.connector_names()
    }

    pub async fn status(&self, name: &str) -> Option<SharedStatus> {
        self.status_table.get_status(name).await
    }

    /// `start` — connects to the destination twice (once for the catalog
    /// resolver, once for the applier) and spawns the connector's
    /// supervisor task.
    pub async fn start(&self, name: &str) -> Result<(), CdcError> {
        if self.handles.lock().await.contains_key(name) {
            return Err(CdcError::Internal(format!("connector {name} is already running")));
        }

        let (connector, app) = {
            let store = self.config_store.lock().await;
            let connector = store
                .connector(name)
                .cloned()
                .ok_or_else(|| CdcError::Config(format!("no connector named {name}")))?;
            (connector, store.config().clone())
        };

        if connector.producer_command.is_empty() {
            return Err(CdcError::Config(format!("connector {name} has no producer_command configured")));
        }

        let rule_set = match &app.rules_file {
            Some(path) => RuleSet::load(connector.source_flavor, Some(path))?,
            None => RuleSet::defaults_only(connector.source_flavor),
        };

        let catalog_client = connect_destination(&app, &connector).await?;
        let resolver: Arc<dyn CatalogResolver> = Arc::new(PostgresCatalog::new(catalog_client));
        let dest_client = connect_destination(&app, &connector).await?;
        let destination: Box<dyn applier::Destination> = Box::new(applier::PostgresDestination::new(dest_client));

        let producer: Box<dyn Producer> = Box::new(ProcessProducer::new(connector.producer_command.clone()));

        let cfg = SupervisorConfig {
            connector: connector.clone(),
            rule_set: Arc::new(rule_set),
            error_strategy: app.error_strategy,
            emission_mode: app.emission_mode.0,
            nap_interval_secs: app.nap_interval_secs,
        };

        let shutdown = Arc::new(AtomicBool::new(false));
        let notify = Arc::new(Notify::new());
        let status_table = self.status_table.clone();
        status_table.ensure(name);

        let task_shutdown = shutdown.clone();
        let task_notify = notify.clone();
        let task_name = name.to_string();
        let join = tokio::spawn(async move {
            if let Err(e) = run_connector(cfg, status_table, resolver, producer, destination, task_shutdown, task_notify).await {
                tracing::error!(connector = %task_name, error = %e, "connector task exited");
            }
        });

        self.handles.lock().await.insert(name.to_string(), ConnectorHandle { join, shutdown, notify });
        Ok(())
    }

    /// `stop` — flips the shutdown flag, wakes the loop early, and waits
    /// for the task to observe it and return.
    pub async fn stop(&self, name: &str) -> Result<(), CdcError> {
        let handle = self.handles.lock().await.remove(name);
        match handle {
            Some(handle) => {
                handle.shutdown.store(true, Ordering::SeqCst);
                handle.notify.notify_one();
                handle.join.await.map_err(|e| CdcError::Internal(format!("connector task panicked: {e}")))
            }
            None => Err(CdcError::Internal(format!("connector {name} is not running"))),
        }
    }

    pub async fn pause(&self, name: &str) -> Result<(), CdcError> {
        self.status_table.post_request(name, RequestKind::Pause, None, None).await?;
        self.wake(name).await;
        Ok(())
    }

    pub async fn resume(&self, name: &str) -> Result<(), CdcError> {
        self.status_table.post_request(name, RequestKind::Resume, None, None).await?;
        self.wake(name).await;
        Ok(())
    }

    pub async fn set_offset(&self, name: &str, offset: &str, file: &str) -> Result<(), CdcError> {
        self.status_table
            .post_request(name, RequestKind::OffsetUpdate, Some(offset.to_string()), Some(file.to_string()))
            .await?;
        self.wake(name).await;
        Ok(())
    }

    async fn wake(&self, name: &str) {
        if let Some(handle) = self.handles.lock().await.get(name) {
            handle.notify.notify_one();
        }
    }

    pub async fn add_conninfo(&self, name: &str, host: &str, port: u16, user: &str, credential: &str) -> Result<(), CdcError> {
        self.config_store.lock().await.add_conninfo(name, host, port, user, credential)
    }

    pub async fn delete_conninfo(&self, name: &str) -> Result<(), CdcError> {
        self.config_store.lock().await.delete_conninfo(name)
    }

    pub async fn add_extra_conninfo(&self, name: &str, key: &str, value: &str) -> Result<(), CdcError> {
        self.config_store.lock().await.add_extra_conninfo(name, key, value)
    }

    pub async fn delete_extra_conninfo(&self, name: &str, key: &str) -> Result<(), CdcError> {
        self.config_store.lock().await.delete_extra_conninfo(name, key)
    }

    pub async fn add_objmap(&self, name: &str, object_type: &str, source_object: &str, destination_object: &str) -> Result<(), CdcError> {
        self.config_store.lock().await.add_objmap(name, object_type, source_object, destination_object)
    }

    pub async fn delete_objmap(&self, name: &str, source_object: &str) -> Result<(), CdcError> {
        self.config_store.lock().await.delete_objmap(name, source_object)
    }
}

async fn connect_destination(app: &AppConfig, connector: &ConnectorConfig) -> Result<tokio_postgres::Client, CdcError> {
    let conn_str = format!(
        "host={} port={} user={} password={} dbname={}",
        app.destination.host, app.destination.port, app.destination.user, app.destination.credential, connector.destination_database
    );
    let (client, connection) = tokio_postgres::connect(&conn_str, tokio_postgres::NoTls)
        .await
        .map_err(|e| CdcError::Apply(format!("connecting to destination: {e}")))?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "destination connection closed with error");
        }
    });
    Ok(client)
}
