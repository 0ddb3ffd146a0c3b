use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Async key-value storage seam shared by every cell.
///
/// Values are whole JSON documents under namespaced string keys
/// (see [`crate::keys::scoped`]). A write is crash-consistent for its own
/// key only; nothing is transactional across keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Value>>, StoreError> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(&key, value).await?;
        }
        Ok(())
    }
}
