//! In-memory persistent store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use aside_core::{Key, Record};
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::PersistentStore;

/// A persistent store held in process memory.
///
/// Useful for local runs and tests. Records are seeded with
/// [`MemoryStore::insert`] or loaded from a JSON file mapping keys to
/// record objects.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Key, Record>>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given records.
    pub fn with_records(records: impl IntoIterator<Item = (Key, Record)>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
            closed: AtomicBool::new(false),
        }
    }

    /// Loads records from a JSON file shaped as `{"<key>": {<record>}, ...}`.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let records: HashMap<Key, Record> = serde_json::from_str(&content).map_err(|e| {
            StoreError::decode(path.display().to_string(), e.to_string())
        })?;

        info!(path = %path.display(), count = records.len(), "Memory store seeded from file");

        Ok(Self {
            records: RwLock::new(records),
            closed: AtomicBool::new(false),
        })
    }

    /// Inserts or replaces a record.
    pub fn insert(&self, key: Key, record: Record) {
        self.records.write().insert(key, record);
    }

    /// Removes a record, returning it if present.
    pub fn remove(&self, key: &Key) -> Option<Record> {
        self.records.write().remove(key)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get(&self, key: &Key) -> Result<Option<Record>, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }

        let record = self.records.read().get(key).cloned();
        debug!(key = %key, found = record.is_some(), "Memory store lookup");
        Ok(record)
    }

    fn name(&self) -> &str {
        "memory"
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
