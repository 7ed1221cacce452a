use serde::{Deserialize, Serialize};

/// Per-connector counters and the six latency timestamps of the last
/// processed batch, surfaced read-only through the admin HTTP status
/// endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub ddl_ops: u64,
    pub dml_ops: u64,
    pub reads: u64,
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub bad_events: u64,
    pub total_events: u64,
    pub batches: u64,
    pub avg_batch_size: f64,

    pub last_batch: BatchLatency,
}

/// Epoch-millisecond timestamps bracketing the last batch's journey from
/// the source through the producer to the destination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchLatency {
    pub source_first_ms: i64,
    pub dbz_first_ms: i64,
    pub destination_first_ms: i64,
    pub source_last_ms: i64,
    pub dbz_last_ms: i64,
    pub destination_last_ms: i64,
}

impl Stats {
    /// Rolls one fully-processed batch of `batch_len` events into the
    /// running average batch size.
    pub fn record_batch(&mut self, batch_len: u64) {
        self.batches += 1;
        self.total_events += batch_len;
        self.avg_batch_size = self.total_events as f64 / self.batches as f64;
    }

    pub fn record_ddl(&mut self) {
        self.ddl_ops += 1;
    }

    pub fn record_dml(&mut self, op: DmlKind) {
        self.dml_ops += 1;
        match op {
            DmlKind::Read => self.reads += 1,
            DmlKind::Insert => self.inserts += 1,
            DmlKind::Update => self.updates += 1,
            DmlKind::Delete => self.deletes += 1,
        }
    }

    pub fn record_bad_event(&mut self) {
        self.bad_events += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlKind {
    Read,
    Insert,
    Update,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_batch_size_tracks_total_events() {
        let mut s = Stats::default();
        s.record_batch(4);
        s.record_batch(6);
        assert_eq!(s.batches, 2);
        assert_eq!(s.total_events, 10);
        assert_eq!(s.avg_batch_size, 5.0);
    }

    #[test]
    fn dml_counters_split_by_kind() {
        let mut s = Stats::default();
        s.record_dml(DmlKind::Insert);
        s.record_dml(DmlKind::Delete);
        assert_eq!(s.dml_ops, 2);
        assert_eq!(s.inserts, 1);
        assert_eq!(s.deletes, 1);
    }
}
