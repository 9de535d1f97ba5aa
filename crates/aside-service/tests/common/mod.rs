//! Recording fakes for the capability traits.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use aside_core::{Key, Record, Ttl};
use aside_service::CacheAsideService;
use aside_stores::{CacheStore, CacheStoreError, PersistentStore, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;

/// A `set` call as seen by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCall {
    pub key: String,
    pub value: Vec<u8>,
    pub ttl: Option<Ttl>,
}

/// Cache fake that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    sets: Mutex<Vec<SetCall>>,
    gets: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl RecordingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_reads() -> Arc<Self> {
        let cache = Self::default();
        cache.fail_reads.store(true, Ordering::SeqCst);
        Arc::new(cache)
    }

    pub fn failing_writes() -> Arc<Self> {
        let cache = Self::default();
        cache.fail_writes.store(true, Ordering::SeqCst);
        Arc::new(cache)
    }

    pub fn seed(&self, key: &str, value: &[u8]) {
        self.entries.lock().insert(key.to_string(), value.to_vec());
    }

    pub fn entry(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> Vec<SetCall> {
        self.sets.lock().clone()
    }
}

#[async_trait]
impl CacheStore for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheStoreError::connection("connection reset by peer"));
        }
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Ttl>) -> Result<(), CacheStoreError> {
        self.sets.lock().push(SetCall {
            key: key.to_string(),
            value: value.to_vec(),
            ttl,
        });
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheStoreError::backend("OOM command not allowed"));
        }
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Store fake that counts lookups and can fail or be slow.
#[derive(Default)]
pub struct RecordingStore {
    records: Mutex<HashMap<Key, Record>>,
    calls: AtomicUsize,
    fail: AtomicBool,
    delay: Option<Duration>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_record(key: &str, record: Record) -> Arc<Self> {
        let store = Self::default();
        store.records.lock().insert(key_of(key), record);
        Arc::new(store)
    }

    pub fn failing() -> Arc<Self> {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    pub fn slow(key: &str, record: Record, delay: Duration) -> Arc<Self> {
        let store = Self {
            delay: Some(delay),
            ..Self::default()
        };
        store.records.lock().insert(key_of(key), record);
        Arc::new(store)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersistentStore for RecordingStore {
    async fn get(&self, key: &Key) -> Result<Option<Record>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::connection("connection refused"));
        }
        Ok(self.records.lock().get(key).cloned())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub fn key_of(raw: &str) -> Key {
    Key::new(raw).expect("test key should be valid")
}

pub fn ttl(secs: u64) -> Ttl {
    Ttl::from_secs(secs).expect("test ttl should be valid")
}

/// The record used throughout: `{"id": 7, "name": "x"}`.
pub fn user_record() -> Record {
    Record::new().with("id", 7).with("name", "x")
}

pub fn service(cache: Arc<RecordingCache>, store: Arc<RecordingStore>) -> CacheAsideService {
    CacheAsideService::new(cache, store, ttl(3600))
}
