//! In-memory `Producer` used by the test suite: pre-loaded with a queue of
//! JSON event strings, returned in order, no subprocess involved.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use common::err::CdcError;

use crate::Producer;

#[derive(Default)]
pub struct FakeProducer {
    pending: VecDeque<String>,
    offsets: HashMap<String, String>,
    started: bool,
    stopped: bool,
}

impl FakeProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one JSON event envelope to be returned by a later
    /// `fetch_events` call, in FIFO order.
    pub fn push_event(&mut self, event: impl Into<String>) {
        self.pending.push_back(event.into());
    }

    pub fn with_events<I: IntoIterator<Item = String>>(mut self, events: I) -> Self {
        self.pending.extend(events);
        self
    }
}

#[async_trait]
impl Producer for FakeProducer {
    async fn start(&mut self) -> Result<(), CdcError> {
        self.started = true;
        Ok(())
    }

    async fn fetch_events(&mut self) -> Result<Vec<String>, CdcError> {
        if !self.started {
            return Err(CdcError::Producer("fetch_events called before start".into()));
        }
        Ok(self.pending.drain(..).collect())
    }

    async fn get_offset(&self, db: &str) -> Result<String, CdcError> {
        Ok(self.offsets.get(db).cloned().unwrap_or_default())
    }

    async fn set_offset(&mut self, db: &str, offset: &str, _file: &str) -> Result<(), CdcError> {
        self.offsets.insert(db.to_string(), offset.to_string());
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), CdcError> {
        self.stopped = true;
        Ok(())
    }
}
