//! Subprocess-backed `Producer`: spawns the configured child process (the
//! embedded Debezium-style runner, out of scope here) and frames its
//! stdout as newline-delimited JSON event envelopes.

use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use common::err::CdcError;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::Producer;

pub struct ProcessProducer {
    command: Vec<String>,
    child: Option<Child>,
    events: Option<mpsc::UnboundedReceiver<String>>,
    offsets: HashMap<String, (String, String)>,
}

impl ProcessProducer {
    pub fn new(command: Vec<String>) -> Self {
        Self { command, child: None, events: None, offsets: HashMap::new() }
    }
}

#[async_trait]
impl Producer for ProcessProducer {
    async fn start(&mut self) -> Result<(), CdcError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| CdcError::Config("producer_command must name at least a program".into()))?;

        let mut child = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CdcError::Producer(format!("spawning {program}: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CdcError::Producer("child process stdout was not piped".into()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "producer subprocess stdout read failed");
                        break;
                    }
                }
            }
        });

        self.child = Some(child);
        self.events = Some(rx);
        Ok(())
    }

    async fn fetch_events(&mut self) -> Result<Vec<String>, CdcError> {
        let rx = self
            .events
            .as_mut()
            .ok_or_else(|| CdcError::Producer("fetch_events called before start".into()))?;

        let mut batch = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(line) => batch.push(line),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    if let Some(child) = self.child.as_mut() {
                        if let Ok(Some(status)) = child.try_wait() {
                            if !status.success() {
                                return Err(CdcError::Producer(format!(
                                    "producer subprocess exited: {status}"
                                )));
                            }
                        }
                    }
                    break;
                }
            }
        }
        Ok(batch)
    }

    async fn get_offset(&self, db: &str) -> Result<String, CdcError> {
        Ok(self.offsets.get(db).map(|(offset, _)| offset.clone()).unwrap_or_default())
    }

    async fn set_offset(&mut self, db: &str, offset: &str, file: &str) -> Result<(), CdcError> {
        self.offsets.insert(db.to_string(), (offset.to_string(), file.to_string()));
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), CdcError> {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
        self.events = None;
        Ok(())
    }
}
