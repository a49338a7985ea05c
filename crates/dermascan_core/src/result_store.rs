//! crates/dermascan_core/src/result_store.rs
//!
//! The ordered collection of analysis results for the current user, mirrored
//! into the `analysisResults` storage key.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{AnalysisResult, NewAnalysisResult};
use crate::persistence::{read_json, write_json, RESULTS_KEY};
use crate::ports::{KeyValueStore, PortError, PortResult};

pub struct ResultStore {
    storage: Arc<dyn KeyValueStore>,
    results: Mutex<Vec<AnalysisResult>>,
}

impl ResultStore {
    /// Creates an empty store without reading persisted history.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            results: Mutex::new(Vec::new()),
        }
    }

    /// Creates a store holding the persisted history.
    ///
    /// An unreadable history document is logged and treated as empty.
    pub async fn open(storage: Arc<dyn KeyValueStore>) -> PortResult<Self> {
        let persisted = read_history(storage.as_ref()).await?;
        debug!("Rehydrated {} analysis results", persisted.len());
        Ok(Self {
            storage,
            results: Mutex::new(persisted),
        })
    }

    /// Stamps the candidate with an id and the current time, appends it, and
    /// merges it into storage.
    ///
    /// A failed storage write is logged and the in-memory insert is kept.
    pub async fn add_result(&self, candidate: NewAnalysisResult) -> AnalysisResult {
        let mut results = self.results.lock().await;
        let result = AnalysisResult::materialize(candidate, Utc::now());
        results.push(result.clone());

        if let Err(e) = self.append_persisted(&result).await {
            warn!("Result {} kept in memory only: {}", result.id, e);
        }
        info!("Stored analysis result {} ({})", result.id, result.disease);
        result
    }

    pub async fn get_result_by_id(&self, id: Uuid) -> Option<AnalysisResult> {
        self.results
            .lock()
            .await
            .iter()
            .find(|result| result.id == id)
            .cloned()
    }

    /// The result with the latest `date`; on a tie, the one inserted last.
    pub async fn most_recent(&self) -> Option<AnalysisResult> {
        self.results
            .lock()
            .await
            .iter()
            .max_by_key(|result| result.date)
            .cloned()
    }

    /// Snapshot in insertion order.
    pub async fn results(&self) -> Vec<AnalysisResult> {
        self.results.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.results.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.lock().await.is_empty()
    }

    /// Empties the in-memory collection; storage is left alone.
    pub async fn clear_in_memory(&self) {
        self.results.lock().await.clear();
    }

    /// Deletes the persisted history; the in-memory collection is left alone.
    pub async fn clear_persisted(&self) -> PortResult<()> {
        let _results = self.results.lock().await;
        self.storage.delete(RESULTS_KEY).await
    }

    async fn append_persisted(&self, result: &AnalysisResult) -> PortResult<()> {
        let mut persisted = read_history(self.storage.as_ref()).await?;
        persisted.push(result.clone());
        write_json(self.storage.as_ref(), RESULTS_KEY, &persisted).await
    }
}

async fn read_history(storage: &dyn KeyValueStore) -> PortResult<Vec<AnalysisResult>> {
    match read_json::<Vec<AnalysisResult>>(storage, RESULTS_KEY).await {
        Ok(persisted) => Ok(persisted.unwrap_or_default()),
        Err(PortError::Serialization(e)) => {
            warn!("Ignoring unreadable analysis history: {}", e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Product, UserDetails};
    use crate::persistence::MemoryStore;
    use async_trait::async_trait;
    use chrono::Duration;

    fn memory() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    fn candidate(disease: &str) -> NewAnalysisResult {
        NewAnalysisResult {
            disease: disease.to_string(),
            description: format!("{} description", disease),
            image_url: "data:image/png;base64,AAAA".to_string(),
            remedies: vec!["Use a humidifier".to_string()],
            products: vec![Product {
                name: "Barrier Repair Cream".to_string(),
                image_url: "/products/cream.png".to_string(),
                description: None,
            }],
            symptoms: vec!["Itching".to_string()],
            confidence: Some(0.87),
            user_details: UserDetails {
                name: "Ana".to_string(),
                age: Some(31),
                gender: "female".to_string(),
                skin_type: "dry".to_string(),
                allergies: vec!["nuts".to_string(), "dairy".to_string()],
            },
        }
    }

    #[tokio::test]
    async fn every_add_is_counted_in_insertion_order() {
        let store = ResultStore::new(memory());
        let mut ids = Vec::new();
        for disease in ["Eczema", "Psoriasis", "Ringworm"] {
            ids.push(store.add_result(candidate(disease)).await.id);
        }

        let results = store.results().await;
        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().map(|r| r.id).collect::<Vec<_>>(), ids);

        let latest = store.most_recent().await.unwrap();
        let max_date = results.iter().map(|r| r.date).max().unwrap();
        assert_eq!(latest.date, max_date);
    }

    #[tokio::test]
    async fn date_is_assigned_at_insertion() {
        let store = ResultStore::new(memory());
        let before = Utc::now();
        let result = store.add_result(candidate("Eczema")).await;
        let after = Utc::now();

        assert!(before <= result.date && result.date <= after);
    }

    #[tokio::test]
    async fn lookup_by_id() {
        let store = ResultStore::new(memory());
        let stored = store.add_result(candidate("Vitiligo")).await;

        assert_eq!(store.get_result_by_id(stored.id).await, Some(stored));
        assert_eq!(store.get_result_by_id(Uuid::new_v4()).await, None);
    }

    #[tokio::test]
    async fn most_recent_prefers_the_later_date() {
        let storage = memory();
        let now = Utc::now();
        let earlier = AnalysisResult::materialize(candidate("Eczema"), now);
        let later = AnalysisResult::materialize(candidate("Eczema"), now + Duration::seconds(5));
        write_json(storage.as_ref(), RESULTS_KEY, &vec![later.clone(), earlier])
            .await
            .unwrap();

        let store = ResultStore::open(storage).await.unwrap();
        assert_eq!(store.most_recent().await, Some(later));
    }

    #[tokio::test]
    async fn empty_store_has_no_most_recent() {
        let store = ResultStore::new(memory());
        assert!(store.is_empty().await);
        assert_eq!(store.most_recent().await, None);
    }

    #[tokio::test]
    async fn results_survive_a_reload() {
        let storage = memory();
        let first = ResultStore::open(storage.clone()).await.unwrap();
        let a = first.add_result(candidate("Eczema")).await;
        let b = first.add_result(candidate("Shingles")).await;

        let reloaded = ResultStore::open(storage).await.unwrap();
        assert_eq!(reloaded.results().await, vec![a, b]);
    }

    #[tokio::test]
    async fn unreadable_history_opens_empty_and_is_replaced_on_add() {
        let storage = memory();
        storage.set(RESULTS_KEY, "{broken").await.unwrap();

        let store = ResultStore::open(storage.clone()).await.unwrap();
        assert!(store.is_empty().await);

        let added = store.add_result(candidate("Vitiligo")).await;
        let reloaded = ResultStore::open(storage).await.unwrap();
        assert_eq!(reloaded.results().await, vec![added]);
    }

    #[tokio::test]
    async fn clearing_memory_keeps_storage_and_vice_versa() {
        let storage = memory();
        let store = ResultStore::open(storage.clone()).await.unwrap();
        store.add_result(candidate("Eczema")).await;

        store.clear_in_memory().await;
        assert_eq!(store.len().await, 0);
        assert_eq!(ResultStore::open(storage.clone()).await.unwrap().len().await, 1);

        store.add_result(candidate("Ringworm")).await;
        store.clear_persisted().await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(storage.get(RESULTS_KEY).await.unwrap().is_none());
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> PortResult<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> PortResult<()> {
            Err(PortError::Storage("quota exceeded".to_string()))
        }

        async fn delete(&self, _key: &str) -> PortResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_persistence_keeps_the_in_memory_result() {
        let store = ResultStore::new(Arc::new(FailingStore));
        let result = store.add_result(candidate("Psoriasis")).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get_result_by_id(result.id).await, Some(result));
    }
}
