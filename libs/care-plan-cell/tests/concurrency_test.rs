//! Interleaving tests for the repository's no-lost-update contract. A
//! delay-injecting store forces every critical section to suspend between
//! its read and its write, which is exactly where an unlocked
//! read-modify-write would lose updates.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use futures::future::join_all;
use serde_json::Value;

use care_plan_cell::{
    CareInstanceRepository, DailyCareInstance, DataUpdateBus, InstanceStatus, ItemType, Priority,
};
use shared_store::{KeyValueStore, MemoryStore, StoreError};

/// Wraps `MemoryStore` and sleeps before every read, so concurrent critical
/// sections are guaranteed to overlap in time.
struct SlowStore {
    inner: MemoryStore,
    read_delay: Duration,
}

impl SlowStore {
    fn new(read_delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            read_delay,
        }
    }
}

#[async_trait]
impl KeyValueStore for SlowStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        tokio::time::sleep(self.read_delay).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key).await
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn instance(id: &str, item_id: &str, hour: u32) -> DailyCareInstance {
    let t = Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap();
    DailyCareInstance {
        id: id.to_string(),
        care_plan_id: "plan-1".to_string(),
        care_plan_item_id: item_id.to_string(),
        patient_id: "patient-1".to_string(),
        date: day(),
        scheduled_time: t,
        window_id: "morning".to_string(),
        window_label: "Morning".to_string(),
        status: InstanceStatus::Pending,
        item_name: format!("Medication {}", id),
        item_type: ItemType::Medication,
        priority: Priority::Medium,
        created_at: t,
        updated_at: t,
        completed_at: None,
        source_log_id: None,
    }
}

fn slow_repository() -> Arc<CareInstanceRepository> {
    Arc::new(CareInstanceRepository::new(
        Arc::new(SlowStore::new(Duration::from_millis(20))),
        DataUpdateBus::default(),
    ))
}

#[tokio::test]
async fn test_concurrent_status_updates_lose_nothing() {
    let repo = slow_repository();
    let seed: Vec<DailyCareInstance> = (1..=5)
        .map(|i| instance(&format!("inst-{}", i), &format!("item-{}", i), 8))
        .collect();
    assert!(repo.upsert_daily_instances("patient-1", day(), seed).await);

    let updates = (1..=5).map(|i| {
        let repo = Arc::clone(&repo);
        async move {
            repo.update_daily_instance_status(
                "patient-1",
                day(),
                &format!("inst-{}", i),
                InstanceStatus::Completed,
                None,
            )
            .await
        }
    });
    let results = join_all(updates).await;
    assert!(results.iter().all(|r| r.is_some()), "every update applied");

    let listed = repo.list_daily_instances("patient-1", day()).await;
    assert_eq!(listed.len(), 5, "no rows lost or duplicated");
    assert!(
        listed.iter().all(|row| row.status == InstanceStatus::Completed),
        "every individual transition is present"
    );
}

// Scenario A: two concurrent completions against one partition, one of them
// on a slow path. Neither may clobber the other, and the untouched row stays
// untouched.
#[tokio::test]
async fn test_scenario_a_concurrent_completions() {
    let repo = slow_repository();
    repo.upsert_daily_instances(
        "patient-1",
        day(),
        vec![
            instance("inst-1", "item-1", 8),
            instance("inst-2", "item-2", 12),
            instance("inst-3", "item-3", 18),
        ],
    )
    .await;

    let (first, second) = tokio::join!(
        repo.update_daily_instance_status(
            "patient-1",
            day(),
            "inst-1",
            InstanceStatus::Completed,
            None,
        ),
        repo.update_daily_instance_status(
            "patient-1",
            day(),
            "inst-2",
            InstanceStatus::Completed,
            None,
        ),
    );
    assert!(first.is_some());
    assert!(second.is_some());

    let listed = repo.list_daily_instances("patient-1", day()).await;
    assert_eq!(listed.len(), 3);
    let status_of = |id: &str| listed.iter().find(|r| r.id == id).unwrap().status;
    assert_eq!(status_of("inst-1"), InstanceStatus::Completed);
    assert_eq!(status_of("inst-2"), InstanceStatus::Completed);
    assert_eq!(status_of("inst-3"), InstanceStatus::Pending);
}

// Scenario B: an upsert of a new instance racing a completion in the same
// partition. Both effects must land.
#[tokio::test]
async fn test_scenario_b_upsert_races_completion() {
    let repo = slow_repository();
    repo.upsert_daily_instances(
        "patient-1",
        day(),
        vec![instance("inst-1", "item-1", 8), instance("inst-2", "item-2", 12)],
    )
    .await;

    let (upserted, updated) = tokio::join!(
        repo.upsert_daily_instances("patient-1", day(), vec![instance("inst-3", "item-3", 18)]),
        repo.update_daily_instance_status(
            "patient-1",
            day(),
            "inst-1",
            InstanceStatus::Completed,
            None,
        ),
    );
    assert!(upserted);
    assert!(updated.is_some());

    let listed = repo.list_daily_instances("patient-1", day()).await;
    assert_eq!(listed.len(), 3, "length increased by exactly one");
    assert!(listed.iter().any(|r| r.id == "inst-3"));
    assert_eq!(
        listed.iter().find(|r| r.id == "inst-1").unwrap().status,
        InstanceStatus::Completed
    );
}

// Scenario C: stale cleanup racing a completion of a still-valid instance.
#[tokio::test]
async fn test_scenario_c_stale_removal_races_completion() {
    let repo = slow_repository();
    repo.upsert_daily_instances(
        "patient-1",
        day(),
        vec![
            instance("inst-1", "item-1", 8),
            instance("inst-2", "item-2", 12),
            instance("inst-3", "item-3", 18),
        ],
    )
    .await;

    let valid: HashSet<String> = ["item-1".to_string()].into_iter().collect();
    let (removed, updated) = tokio::join!(
        repo.remove_stale_instances("patient-1", day(), &valid),
        repo.update_daily_instance_status(
            "patient-1",
            day(),
            "inst-1",
            InstanceStatus::Completed,
            None,
        ),
    );
    assert_eq!(removed, 2, "both stale instances removed");
    assert!(updated.is_some());

    let listed = repo.list_daily_instances("patient-1", day()).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "inst-1");
    assert_eq!(listed[0].status, InstanceStatus::Completed);
}

#[tokio::test]
async fn test_different_partitions_proceed_independently() {
    let repo = slow_repository();
    let other_day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

    let (a, b) = tokio::join!(
        repo.upsert_daily_instances("patient-1", day(), vec![instance("inst-1", "item-1", 8)]),
        repo.upsert_daily_instances("patient-1", other_day, vec![instance("inst-2", "item-2", 8)]),
    );
    assert!(a && b);

    assert_eq!(repo.list_daily_instances("patient-1", day()).await.len(), 1);
    assert_eq!(repo.list_daily_instances("patient-1", other_day).await.len(), 1);
}
