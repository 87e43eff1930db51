#![deny(missing_docs)]
//! In-memory implementation of `maestro-core`'s `SharedStore` trait.
//!
//! Uses a `HashMap` behind a `RwLock` for concurrent reads from the
//! scheduler's dispatch-time input compilation against the occasional
//! write after a worker's output is harvested.

use async_trait::async_trait;
use maestro_core::error::StoreError;
use maestro_core::state::SharedStore;
use maestro_core::value::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory shared store backed by a `HashMap` behind a `RwLock`.
///
/// One instance is created per controller run and owned exclusively by
/// the scheduler — nothing about this type is meant to outlive a single
/// run or be shared across runs.
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn add(&self, key: &str, value: Value) {
        let mut data = self.data.write().await;
        data.entry(key.to_string()).or_insert(value);
    }

    async fn get(&self, key: &str) -> Result<Value, StoreError> {
        let data = self.data.read().await;
        data.get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn update(&self, key: &str, value: Value, create: bool) {
        let mut data = self.data.write().await;
        if data.contains_key(key) {
            data.insert(key.to_string(), value);
        } else if create {
            data.insert(key.to_string(), value);
        }
    }

    async fn exists(&self, key: &str) -> bool {
        let data = self.data.read().await;
        data.contains_key(key)
    }

    async fn remove(&self, key: &str) {
        let mut data = self.data.write().await;
        data.remove(key);
    }
}
