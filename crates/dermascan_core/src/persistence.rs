//! crates/dermascan_core/src/persistence.rs
//!
//! Storage keys and JSON helpers shared by the stores, plus an in-memory
//! `KeyValueStore`.
//!
//! Each key has exactly one owning store; nothing else writes to it.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::ports::{KeyValueStore, PortError, PortResult};

/// Current session. Owned by `SessionStore`.
pub const SESSION_KEY: &str = "user";

/// Account ledger. Owned by `SessionStore`.
pub const USERS_KEY: &str = "users";

/// Analysis history. Owned by `ResultStore`.
pub const RESULTS_KEY: &str = "analysisResults";

/// Reads and decodes a JSON document. A missing key is `None`.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> PortResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> PortResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

//=========================================================================================
// In-memory store
//=========================================================================================

/// A process-local `KeyValueStore`. Cloning is not supported; share it through an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| PortError::Storage("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> PortResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        label: String,
        count: u32,
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        let value: Option<Sample> = read_json(&store, "absent").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn written_documents_read_back() {
        let store = MemoryStore::new();
        let sample = Sample {
            label: "a".to_string(),
            count: 3,
        };
        write_json(&store, "sample", &sample).await.unwrap();

        let back: Option<Sample> = read_json(&store, "sample").await.unwrap();
        assert_eq!(back, Some(sample));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("k", "1").await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_document_is_a_serialization_error() {
        let store = MemoryStore::new();
        store.set("sample", "{not json").await.unwrap();
        let result: PortResult<Option<Sample>> = read_json(&store, "sample").await;
        assert!(matches!(result, Err(PortError::Serialization(_))));
    }
}
