// libs/timeline-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry on the day's schedule. Ephemeral: recomputed on every build,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TimelineItemKind,
    pub scheduled_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub status: TimelineStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medication_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vital_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wellness_checks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Time-relative display status, derived from
/// `(scheduled_time, completed_time, now)` on every build. Distinct from the
/// persisted instance status: nothing here is ever stored, so clock drift or
/// a missed update can only affect the transient display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimelineStatus {
    Upcoming,
    Next,
    Overdue,
    Done,
}

impl fmt::Display for TimelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineStatus::Upcoming => write!(f, "upcoming"),
            TimelineStatus::Next => write!(f, "next"),
            TimelineStatus::Overdue => write!(f, "overdue"),
            TimelineStatus::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineItemKind {
    Medication,
    Vitals,
    Appointment,
    WellnessMorning,
    WellnessEvening,
}

impl TimelineItemKind {
    /// Secondary sort key for items sharing a scheduled time, so ordering
    /// is reproducible rather than an assembly artifact.
    pub fn sort_priority(&self) -> u8 {
        match self {
            TimelineItemKind::Medication => 0,
            TimelineItemKind::Vitals => 1,
            TimelineItemKind::Appointment => 2,
            TimelineItemKind::WellnessMorning => 3,
            TimelineItemKind::WellnessEvening => 4,
        }
    }
}

impl fmt::Display for TimelineItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineItemKind::Medication => write!(f, "medication"),
            TimelineItemKind::Vitals => write!(f, "vitals"),
            TimelineItemKind::Appointment => write!(f, "appointment"),
            TimelineItemKind::WellnessMorning => write!(f, "wellness-morning"),
            TimelineItemKind::WellnessEvening => write!(f, "wellness-evening"),
        }
    }
}

/// Appointment input supplied by the external appointment source; the
/// builder projects each one into exactly one timeline item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub scheduled_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<DateTime<Utc>>,
}
