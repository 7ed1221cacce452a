//! End-to-end scenarios (§8) driving the actual `supervisor::run_connector`
//! loop against `FakeProducer` + `FakeCatalog` + `FakeDestination`. The
//! literal decode/translate scenarios of §8 (1-4) are already covered as
//! unit tests in `ddl::translate` and `dml::translate`; these two exercise
//! the supervisor state machine itself, which those unit tests cannot
//! reach.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use catalog::{CatalogResolver, ColumnEntry, TableEntry};
use common::config::{ConnectorConfig, EmissionMode, ErrorStrategy, SnapshotMode, SourceFlavor};
use common::model::ConnectorState;
use producer::{FakeProducer, Producer};
use rules::RuleSet;
use serde_json::json;
use supervisor::{run_connector, RequestKind, SharedStatus, SharedStatusTable, SupervisorConfig};
use tokio::sync::Notify;

use tests::{FakeCatalog, FakeDestination};

fn sample_connector() -> ConnectorConfig {
    ConnectorConfig {
        name: "inv".to_string(),
        source_flavor: SourceFlavor::MySql,
        host: "127.0.0.1".to_string(),
        port: 3306,
        user: "root".to_string(),
        credential: "secret".to_string(),
        source_database: "inv".to_string(),
        destination_database: "inv".to_string(),
        table_include_list: vec![],
        snapshot_mode: SnapshotMode::Initial,
        producer_command: vec!["debezium-embedded-runner".to_string()],
        extra_conninfo: HashMap::new(),
    }
}

fn orders_entry() -> TableEntry {
    TableEntry {
        table_oid: 16400,
        columns: HashMap::from([
            ("id".to_string(), ColumnEntry { oid: 23, position: 0, typemod: -1 }),
            ("amount".to_string(), ColumnEntry { oid: 1700, position: 1, typemod: -1 }),
        ]),
        primary_key: vec!["id".to_string()],
    }
}

/// Polls the shared status slot until `pred` holds, or panics after ~2
/// seconds. The supervisor loop only advances on its own event-loop
/// iterations, so the test side has no other synchronization point.
async fn wait_for_status(table: &Arc<SharedStatusTable>, name: &str, pred: impl Fn(&SharedStatus) -> bool) -> SharedStatus {
    for _ in 0..200 {
        if let Some(status) = table.get_status(name).await {
            if pred(&status) {
                return status;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within timeout for connector {name}");
}

#[tokio::test]
async fn update_miss_increments_bad_events_and_returns_to_syncing() {
    let update_envelope = json!({
        "payload": {
            "op": "u",
            "source": {"db": "inv", "schema": "public", "table": "orders"},
            "before": {"id": 1, "amount": "AQ=="},
            "after": {"id": 1, "amount": "Ag=="}
        }
    })
    .to_string();

    let cfg = SupervisorConfig {
        connector: sample_connector(),
        rule_set: Arc::new(RuleSet::defaults_only(SourceFlavor::MySql)),
        error_strategy: ErrorStrategy::SkipOnError,
        emission_mode: EmissionMode::Tuple,
        nap_interval_secs: 3600,
    };

    let status_table = SharedStatusTable::new();
    let resolver: Arc<dyn CatalogResolver> = Arc::new(FakeCatalog::new().with_table("public", "orders", orders_entry()));
    let producer: Box<dyn Producer> = Box::new(FakeProducer::new().with_events(vec![update_envelope]));
    let destination = FakeDestination::new().missing_rows();
    let dest_handle = destination.handle();
    let shutdown = Arc::new(AtomicBool::new(false));
    let notify = Arc::new(Notify::new());

    let join = {
        let status_table = status_table.clone();
        let shutdown = shutdown.clone();
        let notify = notify.clone();
        tokio::spawn(async move {
            run_connector(cfg, status_table, resolver, producer, Box::new(destination), shutdown, notify).await
        })
    };

    let status = wait_for_status(&status_table, "inv", |s| s.stats.bad_events > 0).await;

    assert_eq!(status.stats.bad_events, 1);
    assert_eq!(status.state, ConnectorState::Syncing);
    assert!(status.error.contains("tuple to update"));
    assert!(dest_handle.lock().await.dml.is_empty(), "no row should have been written");

    shutdown.store(true, Ordering::SeqCst);
    notify.notify_one();
    join.await.unwrap().unwrap();
}

#[tokio::test]
async fn pause_then_set_offset_consumes_no_events() {
    let cfg = SupervisorConfig {
        connector: sample_connector(),
        rule_set: Arc::new(RuleSet::defaults_only(SourceFlavor::MySql)),
        error_strategy: ErrorStrategy::SkipOnError,
        emission_mode: EmissionMode::Tuple,
        nap_interval_secs: 3600,
    };

    let status_table = SharedStatusTable::new();
    let resolver: Arc<dyn CatalogResolver> = Arc::new(FakeCatalog::new());
    let producer: Box<dyn Producer> = Box::new(FakeProducer::new());
    let destination: Box<dyn applier::Destination> = Box::new(FakeDestination::new());
    let shutdown = Arc::new(AtomicBool::new(false));
    let notify = Arc::new(Notify::new());

    let join = {
        let status_table = status_table.clone();
        let shutdown = shutdown.clone();
        let notify = notify.clone();
        tokio::spawn(async move {
            run_connector(cfg, status_table, resolver, producer, destination, shutdown, notify).await
        })
    };

    wait_for_status(&status_table, "inv", |s| s.state == ConnectorState::Syncing).await;

    status_table.post_request("inv", RequestKind::Pause, None, None).await.unwrap();
    notify.notify_one();
    wait_for_status(&status_table, "inv", |s| s.state == ConnectorState::Paused).await;

    status_table
        .post_request("inv", RequestKind::OffsetUpdate, Some("X".to_string()), Some(String::new()))
        .await
        .unwrap();
    notify.notify_one();
    let status = wait_for_status(&status_table, "inv", |s| s.last_offset == "X").await;

    assert_eq!(status.state, ConnectorState::Paused);
    assert_eq!(status.stats.total_events, 0);
    assert_eq!(status.stats.batches, 0);

    shutdown.store(true, Ordering::SeqCst);
    notify.notify_one();
    join.await.unwrap().unwrap();
}
