//! Bounded in-memory measurement history

use crate::measurement::MeasurementRecord;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default number of retained records.
pub const MAX_HISTORY: usize = 1000;

/// Append-only, capacity-bounded history, newest-first.
///
/// Records are immutable after append and shared by `Arc`, so a
/// snapshot handed to a reader is never altered by later appends or
/// evictions. There is exactly one writer path (the scheduler).
pub struct HistoryStore {
    records: RwLock<VecDeque<Arc<MeasurementRecord>>>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            capacity,
        }
    }

    /// Inserts at the front; evicts from the tail past capacity.
    pub async fn append(&self, record: MeasurementRecord) -> Arc<MeasurementRecord> {
        let record = Arc::new(record);
        let mut records = self.records.write().await;
        records.push_front(record.clone());
        while records.len() > self.capacity {
            records.pop_back();
        }
        record
    }

    /// The full retained history, newest-first.
    pub async fn snapshot(&self) -> Vec<Arc<MeasurementRecord>> {
        self.records.read().await.iter().cloned().collect()
    }

    /// The most recent record, or None while empty.
    pub async fn latest(&self) -> Option<Arc<MeasurementRecord>> {
        self.records.read().await.front().cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
