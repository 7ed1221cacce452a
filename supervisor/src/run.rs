//! Component G: the per-connector supervisor task and its event loop
//! (§4.G). One task per `ConnectorConfig`, started by the admin surface's
//! `start` verb and run until a shutdown flag is observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Notify;

use catalog::{CatalogResolver, DataCache};
use common::config::{ConnectorConfig, EmissionMode, ErrorStrategy};
use common::err::CdcError;
use common::model::{ConnectorStage, ConnectorState, DmlKind};
use producer::Producer;
use rules::RuleSet;

use crate::status::{RequestKind, SharedStatusTable};

/// Everything a supervisor task needs that does not change across the
/// connector's lifetime (immutable, `Arc`-shared per §5).
pub struct SupervisorConfig {
    pub connector: ConnectorConfig,
    pub rule_set: Arc<RuleSet>,
    pub error_strategy: ErrorStrategy,
    pub emission_mode: EmissionMode,
    pub nap_interval_secs: u64,
}

/// Runs one connector's event loop until `shutdown` is observed. Returns
/// `Ok(())` on a clean stop, `Err` on an unrecoverable failure (the caller
/// has already seen the error recorded in `SharedStatus`).
pub async fn run_connector(
    cfg: SupervisorConfig,
    status_table: Arc<SharedStatusTable>,
    resolver: Arc<dyn CatalogResolver>,
    mut producer: Box<dyn Producer>,
    mut destination: Box<dyn applier::Destination>,
    shutdown: Arc<AtomicBool>,
    notify: Arc<Notify>,
) -> Result<(), CdcError> {
    let name = cfg.connector.name.clone();
    status_table.ensure(&name);

    if let Some(existing) = status_table.get_status(&name).await {
        if existing.pid.is_some() {
            return Err(CdcError::Internal(format!("connector {name} is already running")));
        }
    }

    status_table.set_state(&name, ConnectorState::Initializing).await?;
    status_table.clear_error(&name).await?;
    status_table
        .set_databases(&name, &cfg.connector.source_database, &cfg.connector.destination_database)
        .await?;
    status_table.set_pid(&name, Some(std::process::id())).await?;

    if let Err(e) = producer.start().await {
        fail(&status_table, &name, &e).await;
        return Err(e);
    }

    status_table.set_state(&name, ConnectorState::Syncing).await?;

    let mut cache = DataCache::new();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        if let Some(request) = status_table.take_request(&name).await {
            if let Err(e) = handle_request(&status_table, &name, &mut producer, request).await {
                tracing::warn!(connector = %name, error = %e, "control request failed");
            }
        }

        let state = status_table.get_status(&name).await.map(|s| s.state).unwrap_or(ConnectorState::Stopped);

        if state == ConnectorState::Syncing {
            let batch = match producer.fetch_events().await {
                Ok(batch) => batch,
                Err(e) => {
                    fail(&status_table, &name, &e).await;
                    return Err(e);
                }
            };

            if !batch.is_empty() {
                status_table.set_state(&name, ConnectorState::Parsing).await.ok();
                let batch_len = batch.len() as u64;

                for raw_event in &batch {
                    status_table.set_state(&name, ConnectorState::Converting).await.ok();
                    if let Err(e) = process_one(raw_event, &cfg, &mut cache, resolver.as_ref(), destination.as_mut(), &status_table, &name).await {
                        if !e.is_per_event() {
                            fail(&status_table, &name, &e).await;
                            return Err(e);
                        }

                        status_table.update_stats(&name, |s| s.record_bad_event()).await.ok();
                        status_table.set_error(&name, e.to_string()).await.ok();
                        tracing::warn!(connector = %name, error = %e, "per-event failure");

                        match cfg.error_strategy {
                            ErrorStrategy::ExitOnError => {
                                fail(&status_table, &name, &e).await;
                                return Err(e);
                            }
                            ErrorStrategy::SkipOnError => continue,
                            ErrorStrategy::RetryOnError => {
                                if let Err(e2) = process_one(raw_event, &cfg, &mut cache, resolver.as_ref(), destination.as_mut(), &status_table, &name).await {
                                    status_table.set_error(&name, e2.to_string()).await.ok();
                                }
                            }
                        }
                    }
                    status_table.set_state(&name, ConnectorState::Executing).await.ok();
                }

                status_table.update_stats(&name, move |s| s.record_batch(batch_len)).await.ok();
                status_table.set_state(&name, ConnectorState::Syncing).await.ok();
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(cfg.nap_interval_secs)) => {}
            _ = notify.notified() => {}
        }
    }

    let _ = producer.stop().await;
    status_table.set_state(&name, ConnectorState::Stopped).await.ok();
    status_table.set_pid(&name, None).await.ok();
    Ok(())
}

async fn fail(status_table: &SharedStatusTable, name: &str, e: &CdcError) {
    status_table.set_error(name, e.to_string()).await.ok();
    status_table.set_state(name, ConnectorState::Stopped).await.ok();
    status_table.set_pid(name, None).await.ok();
}

async fn handle_request(
    status_table: &SharedStatusTable,
    name: &str,
    producer: &mut Box<dyn Producer>,
    request: crate::status::PendingRequest,
) -> Result<(), CdcError> {
    match request.kind {
        RequestKind::Pause => status_table.set_state(name, ConnectorState::Paused).await,
        RequestKind::Resume => status_table.set_state(name, ConnectorState::Syncing).await,
        RequestKind::OffsetUpdate => {
            status_table.set_state(name, ConnectorState::OffsetUpdate).await?;
            if let Some(offset) = request.offset.as_deref() {
                let file = request.file.as_deref().unwrap_or("");
                producer.set_offset(name, offset, file).await?;
                status_table.set_offset(name, offset).await?;
            }
            status_table.set_state(name, ConnectorState::Paused).await
        }
    }
}

async fn process_one(
    raw_event: &str,
    cfg: &SupervisorConfig,
    cache: &mut DataCache,
    resolver: &dyn CatalogResolver,
    destination: &mut dyn applier::Destination,
    status_table: &SharedStatusTable,
    name: &str,
) -> Result<(), CdcError> {
    let envelope: Value = serde_json::from_str(raw_event)?;

    if envelope.pointer("/payload/ddl").is_some() {
        if let Some(statement) = ddl::translate_ddl(&envelope, &cfg.rule_set, resolver, cache).await? {
            destination.apply_ddl(&statement).await?;
        }
        status_table.update_stats(name, |s| s.record_ddl()).await.ok();
    } else if envelope.pointer("/payload/op").is_some() {
        let emission = dml::translate_dml(&envelope, &cfg.rule_set, resolver, cache, cfg.emission_mode).await?;
        let outcome = destination.apply_dml(&emission).await?;
        if matches!(outcome, applier::DmlOutcome::NotFound) {
            return Err(CdcError::Apply("tuple to update/delete not found".into()));
        }
        let kind = dml_kind(&envelope)?;
        status_table.update_stats(name, move |s| s.record_dml(kind)).await.ok();
    } else {
        return Err(CdcError::Parse("event has neither payload.ddl nor payload.op".into()));
    }

    if let Some(stage) = snapshot_stage(&envelope) {
        status_table.set_stage(name, stage).await.ok();
    }
    Ok(())
}

fn dml_kind(envelope: &Value) -> Result<DmlKind, CdcError> {
    match envelope.pointer("/payload/op").and_then(Value::as_str) {
        Some("r") => Ok(DmlKind::Read),
        Some("c") => Ok(DmlKind::Insert),
        Some("u") => Ok(DmlKind::Update),
        Some("d") => Ok(DmlKind::Delete),
        other => Err(CdcError::Parse(format!("unrecognized payload.op: {other:?}"))),
    }
}

/// `payload.source.snapshot ∈ {true, "last"}` means still replaying the
/// initial snapshot; anything else means live change-data-capture.
fn snapshot_stage(envelope: &Value) -> Option<ConnectorStage> {
    let snapshot = envelope.pointer("/payload/source/snapshot")?;
    let in_snapshot = match snapshot {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true" || s == "last",
        _ => false,
    };
    Some(if in_snapshot { ConnectorStage::InitialSnapshot } else { ConnectorStage::ChangeDataCapture })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_true_maps_to_initial_snapshot_stage() {
        let envelope = json!({"payload": {"source": {"snapshot": true}}});
        assert_eq!(snapshot_stage(&envelope), Some(ConnectorStage::InitialSnapshot));
    }

    #[test]
    fn snapshot_last_string_maps_to_initial_snapshot_stage() {
        let envelope = json!({"payload": {"source": {"snapshot": "last"}}});
        assert_eq!(snapshot_stage(&envelope), Some(ConnectorStage::InitialSnapshot));
    }

    #[test]
    fn snapshot_false_maps_to_change_data_capture_stage() {
        let envelope = json!({"payload": {"source": {"snapshot": false}}});
        assert_eq!(snapshot_stage(&envelope), Some(ConnectorStage::ChangeDataCapture));
    }
}
