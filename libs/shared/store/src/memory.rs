use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// In-process store backed by a hash map. The default backend for tests
/// and for callers that manage their own persistence.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Value>>, StoreError> {
        let entries = self.entries.read().await;
        Ok(keys.iter().map(|key| entries.get(key).cloned()).collect())
    }

    async fn set_many(&self, batch: Vec<(String, Value)>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        for (key, value) in batch {
            entries.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_set_remove_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("a").await.unwrap().is_none());

        store.set("a", json!({"n": 1})).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(json!({"n": 1})));

        store.remove("a").await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_operations() {
        let store = MemoryStore::new();
        store
            .set_many(vec![
                ("x".to_string(), json!(1)),
                ("y".to_string(), json!(2)),
            ])
            .await
            .unwrap();

        let values = store
            .get_many(&["x".to_string(), "missing".to_string(), "y".to_string()])
            .await
            .unwrap();
        assert_eq!(values, vec![Some(json!(1)), None, Some(json!(2))]);
    }
}
