use serde_json::Value;
use tracing::{debug, warn};

use crate::store::KeyValueStore;

/// Read a value by trying an ordered list of candidate keys. The first entry
/// is the canonical key; later entries are legacy key shapes from older app
/// versions. A hit under a legacy key is lazily written back to the canonical
/// key so subsequent reads take the fast path. Write-back failure is absorbed.
pub async fn read_with_fallback(store: &dyn KeyValueStore, candidates: &[String]) -> Option<Value> {
    for (index, key) in candidates.iter().enumerate() {
        let value = match store.get(key).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Fallback read failed for key {}: {}", key, e);
                continue;
            }
        };

        if let Some(value) = value {
            if index > 0 {
                let canonical = &candidates[0];
                debug!("Migrating value from legacy key {} to {}", key, canonical);
                if let Err(e) = store.set(canonical, value.clone()).await {
                    warn!("Write-back to canonical key {} failed: {}", canonical, e);
                }
            }
            return Some(value);
        }
    }

    None
}
