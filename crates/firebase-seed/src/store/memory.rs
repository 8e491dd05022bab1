//! In-process document store.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{DocumentStore, IdAllocator, StoreError};
use crate::record::Record;

type Collections = BTreeMap<String, BTreeMap<String, Record>>;

/// Keeps documents in memory, keyed by collection then id.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    ids: IdAllocator,
    rejected: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write to `collection` fail as a permission error.
    #[cfg(test)]
    pub(crate) fn reject_writes_to(mut self, collection: impl Into<String>) -> Self {
        self.rejected.insert(collection.into());
        self
    }

    pub async fn document(&self, collection: &str, id: &str) -> Option<Record> {
        self.collections
            .lock()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Snapshot of one collection.
    pub async fn collection(&self, collection: &str) -> BTreeMap<String, Record> {
        self.collections
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of every collection.
    pub async fn snapshot(&self) -> Collections {
        self.collections.lock().await.clone()
    }

    /// Total number of stored documents.
    pub async fn len(&self) -> usize {
        self.collections.lock().await.values().map(BTreeMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn allocate_id(&self, _collection: &str) -> Result<String, StoreError> {
        Ok(self.ids.next().await)
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Record,
    ) -> Result<(), StoreError> {
        if self.rejected.contains(collection) {
            return Err(StoreError::Rejected {
                path: format!("{collection}/{id}"),
                status: 403,
                message: "Missing or insufficient permissions.".to_string(),
            });
        }

        self.collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[tokio::test]
    async fn test_set_overwrites_instead_of_merging() {
        let store = MemoryStore::new();
        store
            .set_document("products", "p1", &record(json!({"name": "Widget", "color": "red"})))
            .await
            .unwrap();
        store
            .set_document("products", "p1", &record(json!({"name": "Widget v2"})))
            .await
            .unwrap();

        assert_eq!(
            store.document("products", "p1").await,
            Some(record(json!({"name": "Widget v2"})))
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_rejected_collection() {
        let store = MemoryStore::new().reject_writes_to("contact");

        let err = store
            .set_document("contact", "c1", &record(json!({})))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Rejected { status: 403, .. }));
        assert!(store.is_empty().await);
    }
}
