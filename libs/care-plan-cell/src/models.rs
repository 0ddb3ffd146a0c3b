// libs/care-plan-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store entity prefix for the per-(patient, date) instance partition.
pub const CARE_INSTANCES_ENTITY: &str = "care_instances";

/// Store entity prefix for the per-day wellness completion record.
pub const WELLNESS_COMPLETION_ENTITY: &str = "wellness_completion";

// ==============================================================================
// DAILY CARE INSTANCE
// ==============================================================================

/// One concrete, date-scoped occurrence of a recurring care-plan item
/// (a dose, a check, a meal slot). Persisted as part of its
/// `(patient_id, date)` partition document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyCareInstance {
    pub id: String,
    pub care_plan_id: String,
    pub care_plan_item_id: String,
    pub patient_id: String,
    pub date: NaiveDate,
    pub scheduled_time: DateTime<Utc>,
    pub window_id: String,
    pub window_label: String,
    pub status: InstanceStatus,
    pub item_name: String,
    pub item_type: ItemType,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_log_id: Option<String>,
}

impl DailyCareInstance {
    /// Apply a status transition.
    ///
    /// Policy: every transition between persisted statuses is permitted,
    /// including reverting a terminal status back to `pending` (caregiver
    /// undo after a mis-tap). Entering `completed` stamps `completed_at` and
    /// the optional `source_log_id`; leaving `completed` clears both.
    /// `updated_at` is refreshed on every applied transition.
    pub fn apply_status(
        &mut self,
        new_status: InstanceStatus,
        source_log_id: Option<String>,
        now: DateTime<Utc>,
    ) {
        let entering_completed =
            new_status == InstanceStatus::Completed && self.status != InstanceStatus::Completed;
        let leaving_completed =
            new_status != InstanceStatus::Completed && self.status == InstanceStatus::Completed;

        if entering_completed {
            self.completed_at = Some(now);
        }
        if leaving_completed {
            self.completed_at = None;
            self.source_log_id = None;
        }
        if let Some(log_id) = source_log_id {
            self.source_log_id = Some(log_id);
        }

        self.status = new_status;
        self.updated_at = now;
    }
}

/// Persisted, action-driven status of an instance. Distinct from the
/// time-relative timeline status, which is derived and never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Pending,
    Completed,
    Skipped,
    Missed,
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceStatus::Pending => write!(f, "pending"),
            InstanceStatus::Completed => write!(f, "completed"),
            InstanceStatus::Skipped => write!(f, "skipped"),
            InstanceStatus::Missed => write!(f, "missed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    Medication,
    Vitals,
    Mood,
    Nutrition,
    Appointment,
    WellnessMorning,
    WellnessEvening,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Medication => write!(f, "medication"),
            ItemType::Vitals => write!(f, "vitals"),
            ItemType::Mood => write!(f, "mood"),
            ItemType::Nutrition => write!(f, "nutrition"),
            ItemType::Appointment => write!(f, "appointment"),
            ItemType::WellnessMorning => write!(f, "wellness-morning"),
            ItemType::WellnessEvening => write!(f, "wellness-evening"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

// ==============================================================================
// WELLNESS COMPLETION RECORD
// ==============================================================================

/// Per-day completion record for the always-on wellness checks and the
/// optional vitals check. These completions live outside the instance
/// partition because the checks are core and cannot be disabled or removed
/// by care-plan edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WellnessCompletion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morning_done_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evening_done_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitals_done_at: Option<DateTime<Utc>>,
}

impl WellnessCompletion {
    pub fn done_at(&self, check: WellnessCheckKind) -> Option<DateTime<Utc>> {
        match check {
            WellnessCheckKind::Morning => self.morning_done_at,
            WellnessCheckKind::Evening => self.evening_done_at,
            WellnessCheckKind::Vitals => self.vitals_done_at,
        }
    }

    pub fn mark_done(&mut self, check: WellnessCheckKind, at: DateTime<Utc>) {
        match check {
            WellnessCheckKind::Morning => self.morning_done_at = Some(at),
            WellnessCheckKind::Evening => self.evening_done_at = Some(at),
            WellnessCheckKind::Vitals => self.vitals_done_at = Some(at),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WellnessCheckKind {
    Morning,
    Evening,
    Vitals,
}

impl fmt::Display for WellnessCheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WellnessCheckKind::Morning => write!(f, "morning"),
            WellnessCheckKind::Evening => write!(f, "evening"),
            WellnessCheckKind::Vitals => write!(f, "vitals"),
        }
    }
}
