// libs/care-plan-cell/src/services/repository.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use shared_store::{keys, KeyValueStore};

use crate::error::CarePlanError;
use crate::models::{
    DailyCareInstance, InstanceStatus, WellnessCheckKind, WellnessCompletion,
    CARE_INSTANCES_ENTITY, WELLNESS_COMPLETION_ENTITY,
};
use crate::services::events::{DataUpdate, DataUpdateBus};
use crate::services::keyed_lock::KeyedLock;

/// Owner of the `DailyCareInstance` partitions, one per `(patient_id, date)`.
///
/// Every mutation runs inside the keyed lock for its partition, so any two
/// operations on the same partition are fully serialized and no write can be
/// based on stale in-memory state. Reads are unlocked and eventually
/// consistent. Storage failures are absorbed here and surfaced as
/// `false`/`None`/empty returns, never as errors.
pub struct CareInstanceRepository {
    store: Arc<dyn KeyValueStore>,
    locks: KeyedLock,
    events: DataUpdateBus,
}

impl CareInstanceRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, events: DataUpdateBus) -> Self {
        Self {
            store,
            locks: KeyedLock::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataUpdate> {
        self.events.subscribe()
    }

    /// Unlocked read of a partition. A read concurrent with an in-flight
    /// write may observe the pre-write state; no caller depends on
    /// linearizable reads.
    pub async fn list_daily_instances(
        &self,
        patient_id: &str,
        date: NaiveDate,
    ) -> Vec<DailyCareInstance> {
        let key = partition_key(patient_id, date);
        self.read_partition_or_empty(&key).await
    }

    /// Merge-by-id upsert of a batch of instances into the partition.
    /// Rows sharing an existing id replace that row in place; unseen ids are
    /// appended in input order. Idempotent: applying the same batch twice
    /// yields the same persisted set. Returns `false` on storage failure.
    pub async fn upsert_daily_instances(
        &self,
        patient_id: &str,
        date: NaiveDate,
        instances: Vec<DailyCareInstance>,
    ) -> bool {
        let key = partition_key(patient_id, date);
        let lock_key = lock_key(patient_id, date);
        debug!(
            "Upserting {} instances into partition {}",
            instances.len(),
            key
        );

        let written = self
            .locks
            .with_key(&lock_key, async {
                let mut current = self.read_partition_or_empty(&key).await;

                for incoming in instances {
                    match current.iter_mut().find(|row| row.id == incoming.id) {
                        Some(existing) => *existing = incoming,
                        None => current.push(incoming),
                    }
                }

                self.write_partition(&key, &current).await
            })
            .await;

        if written {
            self.events.emit(patient_id, date);
        }
        written
    }

    /// Locked read-modify-write of one instance's status. Returns the
    /// updated row, or `None` when the instance is absent (an expected
    /// outcome, e.g. removed by a concurrent stale-cleanup) or when the
    /// write fails.
    pub async fn update_daily_instance_status(
        &self,
        patient_id: &str,
        date: NaiveDate,
        instance_id: &str,
        new_status: InstanceStatus,
        source_log_id: Option<String>,
    ) -> Option<DailyCareInstance> {
        let key = partition_key(patient_id, date);
        let lock_key = lock_key(patient_id, date);

        let updated = self
            .locks
            .with_key(&lock_key, async {
                let mut current = self.read_partition_or_empty(&key).await;

                let Some(row) = current.iter_mut().find(|row| row.id == instance_id) else {
                    debug!("Instance {} not found in partition {}", instance_id, key);
                    return None;
                };

                row.apply_status(new_status, source_log_id, Utc::now());
                let updated = row.clone();

                if !self.write_partition(&key, &current).await {
                    return None;
                }

                info!(
                    "Instance {} in {} moved to status {}",
                    instance_id, key, new_status
                );
                Some(updated)
            })
            .await;

        if updated.is_some() {
            self.events.emit(patient_id, date);
        }
        updated
    }

    /// Remove every instance whose `care_plan_item_id` is no longer in
    /// `valid_item_ids` (its source recurring item was deleted or
    /// deactivated). Returns the number removed; 0 on storage failure.
    pub async fn remove_stale_instances(
        &self,
        patient_id: &str,
        date: NaiveDate,
        valid_item_ids: &HashSet<String>,
    ) -> usize {
        let key = partition_key(patient_id, date);
        let lock_key = lock_key(patient_id, date);

        let removed = self
            .locks
            .with_key(&lock_key, async {
                let current = self.read_partition_or_empty(&key).await;
                let before = current.len();

                let kept: Vec<DailyCareInstance> = current
                    .into_iter()
                    .filter(|row| valid_item_ids.contains(&row.care_plan_item_id))
                    .collect();
                let removed = before - kept.len();

                if removed == 0 {
                    return 0;
                }
                if !self.write_partition(&key, &kept).await {
                    return 0;
                }

                info!("Removed {} stale instances from {}", removed, key);
                removed
            })
            .await;

        if removed > 0 {
            self.events.emit(patient_id, date);
        }
        removed
    }

    /// Unlocked read of the day's wellness completion record. Missing or
    /// unreadable records degrade to the default (nothing done yet).
    pub async fn wellness_completion(
        &self,
        patient_id: &str,
        date: NaiveDate,
    ) -> WellnessCompletion {
        let key = completion_key(patient_id, date);
        match self.store.get(&key).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Corrupt wellness completion record {}: {}", key, e);
                WellnessCompletion::default()
            }),
            Ok(None) => WellnessCompletion::default(),
            Err(e) => {
                warn!("Failed to read wellness completion {}: {}", key, e);
                WellnessCompletion::default()
            }
        }
    }

    /// Locked read-modify-write marking one wellness check done. Shares the
    /// day's lock partition with the instance operations so a day's writes
    /// serialize together. Returns `false` on storage failure.
    pub async fn mark_wellness_done(
        &self,
        patient_id: &str,
        date: NaiveDate,
        check: WellnessCheckKind,
        at: DateTime<Utc>,
    ) -> bool {
        let key = completion_key(patient_id, date);
        let lock_key = lock_key(patient_id, date);

        let written = self
            .locks
            .with_key(&lock_key, async {
                let mut record = self.wellness_completion(patient_id, date).await;
                record.mark_done(check, at);

                let value = match serde_json::to_value(&record) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("Failed to serialize wellness completion {}: {}", key, e);
                        return false;
                    }
                };
                match self.store.set(&key, value).await {
                    Ok(()) => {
                        info!("Marked {} check done for {}", check, key);
                        true
                    }
                    Err(e) => {
                        warn!("Failed to write wellness completion {}: {}", key, e);
                        false
                    }
                }
            })
            .await;

        if written {
            self.events.emit(patient_id, date);
        }
        written
    }

    async fn read_partition(&self, key: &str) -> Result<Vec<DailyCareInstance>, CarePlanError> {
        match self.store.get(key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Read failure is treated as "no data": logged, then the operation
    /// proceeds with an empty partition.
    async fn read_partition_or_empty(&self, key: &str) -> Vec<DailyCareInstance> {
        match self.read_partition(key).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Failed to read partition {}: {}", key, e);
                Vec::new()
            }
        }
    }

    async fn write_partition(&self, key: &str, rows: &[DailyCareInstance]) -> bool {
        let value = match serde_json::to_value(rows) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to serialize partition {}: {}", key, e);
                return false;
            }
        };
        match self.store.set(key, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write partition {}: {}", key, e);
                false
            }
        }
    }
}

fn partition_key(patient_id: &str, date: NaiveDate) -> String {
    keys::scoped(CARE_INSTANCES_ENTITY, patient_id, &date.to_string())
}

fn completion_key(patient_id: &str, date: NaiveDate) -> String {
    keys::scoped(WELLNESS_COMPLETION_ENTITY, patient_id, &date.to_string())
}

fn lock_key(patient_id: &str, date: NaiveDate) -> String {
    format!("{}:{}", patient_id, date)
}
