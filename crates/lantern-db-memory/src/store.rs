use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use serde_json::Value;

use lantern_storage::{DocumentStore, Filter, StorageError};

pub type StorageKey = String; // Format: "collection/id"

fn make_storage_key(collection: &str, id: &str) -> StorageKey {
    format!("{collection}/{id}")
}

fn document_id(document: &Value) -> &str {
    document.get("id").and_then(|v| v.as_str()).unwrap_or("")
}

/// In-memory document store using a papaya lock-free HashMap.
///
/// Documents are keyed `collection/id`; documents inserted without an id
/// land under a synthetic key and are only reachable through scans. Used as
/// the test double everywhere a store stub is needed and as the default
/// backend of the standalone binary.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Arc<PapayaHashMap<StorageKey, Value>>,
    /// Fallback key suffix for documents inserted without an id
    anonymous_counter: AtomicU64,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored across all collections.
    pub fn len(&self) -> usize {
        self.data.pin().iter().count()
    }

    /// Returns true if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of documents in one collection.
    pub fn count_in(&self, collection: &str) -> usize {
        let prefix = format!("{collection}/");
        self.data
            .pin()
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .count()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Value>, StorageError> {
        let prefix = format!("{collection}/");
        let guard = self.data.pin();
        let mut matches: Vec<(&String, &Value)> = guard
            .iter()
            .filter(|(key, doc)| key.starts_with(&prefix) && filter.matches(doc))
            .collect();
        // Papaya iteration order is arbitrary; key order keeps scans stable
        // across identical store contents.
        matches.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(matches
            .into_iter()
            .take(limit)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, StorageError> {
        Ok(self.find(collection, filter, 1).await?.into_iter().next())
    }

    async fn insert(&self, collection: &str, document: &Value) -> Result<(), StorageError> {
        let id = document_id(document);
        let key = if id.is_empty() {
            let n = self.anonymous_counter.fetch_add(1, Ordering::Relaxed);
            make_storage_key(collection, &format!("anon-{n}"))
        } else {
            make_storage_key(collection, id)
        };
        self.data.pin().insert(key, document.clone());
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        document: &Value,
    ) -> Result<u64, StorageError> {
        let prefix = format!("{collection}/");
        let guard = self.data.pin();
        let matched: Vec<StorageKey> = guard
            .iter()
            .filter(|(key, doc)| key.starts_with(&prefix) && filter.matches(doc))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matched {
            guard.insert(key.clone(), document.clone());
        }
        Ok(matched.len() as u64)
    }

    async fn remove(&self, collection: &str, filter: &Filter) -> Result<u64, StorageError> {
        let prefix = format!("{collection}/");
        let guard = self.data.pin();
        let matched: Vec<StorageKey> = guard
            .iter()
            .filter(|(key, doc)| key.starts_with(&prefix) && filter.matches(doc))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matched {
            guard.remove(key);
        }
        Ok(matched.len() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
