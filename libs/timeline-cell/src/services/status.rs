// libs/timeline-cell/src/services/status.rs
//
// Pure status engine: every function is a function of its arguments only,
// so a rebuild at a different `now` can never corrupt stored state.

use chrono::{DateTime, Utc};

use crate::models::{TimelineItem, TimelineItemKind, TimelineStatus};

/// Base status of a single item. `done` wins regardless of schedule;
/// otherwise an item is `overdue` strictly after its scheduled time.
/// Never returns `next`; promotion is a property of the whole list.
pub fn status_of(
    scheduled_time: DateTime<Utc>,
    completed_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> TimelineStatus {
    if completed_time.is_some() {
        TimelineStatus::Done
    } else if now > scheduled_time {
        TimelineStatus::Overdue
    } else {
        TimelineStatus::Upcoming
    }
}

/// The promotion pass: sort, compute per-item statuses, then promote the
/// earliest `upcoming` item to `next`. The output contains at most one
/// `next` item, and zero when nothing is upcoming.
///
/// Sort order is scheduled time, then item-kind display priority, then id,
/// so ties are reproducible.
pub fn with_statuses(mut items: Vec<TimelineItem>, now: DateTime<Utc>) -> Vec<TimelineItem> {
    items.sort_by(|a, b| {
        a.scheduled_time
            .cmp(&b.scheduled_time)
            .then_with(|| a.kind.sort_priority().cmp(&b.kind.sort_priority()))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut promoted = false;
    for item in items.iter_mut() {
        let mut status = status_of(item.scheduled_time, item.completed_time, now);
        if status == TimelineStatus::Upcoming && !promoted {
            status = TimelineStatus::Next;
            promoted = true;
        }
        item.status = status;
        item.subtitle = subtitle_for(item, now);
    }
    items
}

/// Deterministic subtitle keyed on `(status, kind)`. This is presentation,
/// but it encodes the user-visible distinction between "a few minutes late"
/// and "hours late", so it stays under test.
pub fn subtitle_for(item: &TimelineItem, now: DateTime<Utc>) -> String {
    match item.status {
        TimelineStatus::Done => match item.kind {
            TimelineItemKind::Medication => {
                let taken = item.medication_ids.len().max(1);
                if taken == 1 {
                    "1 medication taken".to_string()
                } else {
                    format!("{} medications taken", taken)
                }
            }
            _ => match item.completed_time {
                Some(at) => format!("Completed at {}", at.format("%H:%M")),
                None => "Completed".to_string(),
            },
        },
        TimelineStatus::Overdue => {
            // Minutes until an hour has passed, whole hours after that.
            let minutes = (now - item.scheduled_time).num_minutes().max(1);
            if minutes < 60 {
                format!("{} min overdue", minutes)
            } else {
                format!("{} hr overdue", minutes / 60)
            }
        }
        TimelineStatus::Upcoming | TimelineStatus::Next => match item.kind {
            TimelineItemKind::Medication => {
                let due = item.medication_ids.len().max(1);
                if due == 1 {
                    "1 medication due".to_string()
                } else {
                    format!("{} medications due", due)
                }
            }
            TimelineItemKind::Vitals => {
                if item.vital_types.is_empty() {
                    "Vitals check".to_string()
                } else {
                    item.vital_types.join(", ")
                }
            }
            TimelineItemKind::WellnessMorning => {
                if item.wellness_checks.is_empty() {
                    "Morning check-in".to_string()
                } else {
                    item.wellness_checks.join(", ")
                }
            }
            TimelineItemKind::WellnessEvening => {
                if item.wellness_checks.is_empty() {
                    "Evening check-in".to_string()
                } else {
                    item.wellness_checks.join(", ")
                }
            }
            TimelineItemKind::Appointment => match &item.location {
                Some(location) => location.clone(),
                None => format!("Scheduled for {}", item.scheduled_time.format("%H:%M")),
            },
        },
    }
}
