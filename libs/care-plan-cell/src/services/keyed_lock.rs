// libs/care-plan-cell/src/services/keyed_lock.rs
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::trace;

/// An arena of lightweight locks indexed by string key.
///
/// Callers sharing a key run their critical sections one at a time, in FIFO
/// request order (tokio's mutex queues waiters fairly). Distinct keys never
/// contend. Lock entries are created on first use and kept for the life of
/// the process; the key space here is patient x date, which stays small.
#[derive(Default)]
pub struct KeyedLock {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `section` exclusively among callers sharing `key`.
    ///
    /// The guard is held across the whole section and released on every exit
    /// path, including panics, so a failing section can never leave the key
    /// permanently locked. No timeout is applied: a section that never
    /// completes starves later waiters on the same key.
    pub async fn with_key<T, Fut>(&self, key: &str, section: Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        let entry = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        trace!("Acquiring keyed lock {}", key);
        let _guard = entry.lock().await;
        trace!("Entered critical section for {}", key);
        section.await
    }
}
