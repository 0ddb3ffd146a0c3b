// libs/care-plan-cell/src/services/events.rs
use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::debug;

/// Patient/date-scoped "data changed" signal. Carries no payload beyond the
/// scope: subscribers re-read whatever they depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUpdate {
    pub patient_id: String,
    pub date: NaiveDate,
}

/// Explicit change-notification bus injected into the repository, so tests
/// can assert notification behavior instead of relying on a hidden global.
#[derive(Clone)]
pub struct DataUpdateBus {
    tx: broadcast::Sender<DataUpdate>,
}

impl DataUpdateBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataUpdate> {
        self.tx.subscribe()
    }

    /// Fire-and-forget: emitting with no live subscribers is not an error,
    /// and no ordering is guaranteed relative to other notifications.
    pub fn emit(&self, patient_id: &str, date: NaiveDate) {
        let update = DataUpdate {
            patient_id: patient_id.to_string(),
            date,
        };
        debug!("Emitting data update for {} on {}", patient_id, date);
        let _ = self.tx.send(update);
    }
}

impl Default for DataUpdateBus {
    fn default() -> Self {
        Self::new(32)
    }
}
