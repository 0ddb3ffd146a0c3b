// libs/timeline-cell/src/services/builder.rs
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use care_plan_cell::{
    CareInstanceRepository, DailyCareInstance, InstanceStatus, ItemType, WellnessCheckKind,
};
use shared_config::AppConfig;

use crate::models::{AppointmentRecord, TimelineItem, TimelineItemKind, TimelineStatus};
use crate::services::status::with_statuses;

const DEFAULT_VITAL_TYPES: &[&str] = &["Blood pressure", "Heart rate", "Weight"];
const MORNING_CHECKS: &[&str] = &["Mood", "Energy", "Sleep quality"];
const EVENING_CHECKS: &[&str] = &["Mood", "Pain level", "Day notes"];

/// Assembles one ordered, status-annotated schedule for a day out of the
/// medication instances (one item per schedule window, not one per pill),
/// the day's appointments, and the always-on wellness checks. Reads only;
/// instances are never mutated here.
pub struct TimelineBuilder {
    repo: Arc<CareInstanceRepository>,
    config: AppConfig,
}

impl TimelineBuilder {
    pub fn new(repo: Arc<CareInstanceRepository>, config: AppConfig) -> Self {
        Self { repo, config }
    }

    pub async fn build_day(
        &self,
        patient_id: &str,
        date: NaiveDate,
        appointments: &[AppointmentRecord],
        now: DateTime<Utc>,
    ) -> Vec<TimelineItem> {
        debug!("Building timeline for {} on {}", patient_id, date);

        let instances = self.repo.list_daily_instances(patient_id, date).await;
        let completion = self.repo.wellness_completion(patient_id, date).await;

        let mut items = medication_window_items(&instances);

        for appointment in appointments {
            items.push(TimelineItem {
                id: format!("appointment-{}", appointment.id),
                kind: TimelineItemKind::Appointment,
                scheduled_time: appointment.scheduled_time,
                completed_time: appointment.completed_time,
                title: appointment.title.clone(),
                subtitle: String::new(),
                status: TimelineStatus::Upcoming,
                medication_ids: Vec::new(),
                vital_types: Vec::new(),
                wellness_checks: Vec::new(),
                appointment_id: Some(appointment.id.clone()),
                location: appointment.location.clone(),
            });
        }

        // The wellness checks are core: exactly one morning and one evening
        // entry per day, whether or not anything else is scheduled.
        items.push(wellness_item(
            TimelineItemKind::WellnessMorning,
            "Morning check-in",
            MORNING_CHECKS,
            date,
            self.config.wellness_morning_time,
            completion.done_at(WellnessCheckKind::Morning),
        ));
        items.push(wellness_item(
            TimelineItemKind::WellnessEvening,
            "Evening check-in",
            EVENING_CHECKS,
            date,
            self.config.wellness_evening_time,
            completion.done_at(WellnessCheckKind::Evening),
        ));

        if self.config.vitals_check_enabled {
            items.push(TimelineItem {
                id: "vitals-check".to_string(),
                kind: TimelineItemKind::Vitals,
                scheduled_time: at(date, self.config.vitals_time),
                completed_time: completion.done_at(WellnessCheckKind::Vitals),
                title: "Vitals check".to_string(),
                subtitle: String::new(),
                status: TimelineStatus::Upcoming,
                medication_ids: Vec::new(),
                vital_types: DEFAULT_VITAL_TYPES.iter().map(|s| s.to_string()).collect(),
                wellness_checks: Vec::new(),
                appointment_id: None,
                location: None,
            });
        }

        let items = with_statuses(items, now);
        debug!("Built {} timeline items for {}", items.len(), patient_id);
        items
    }
}

/// One item per medication schedule window. The window is complete only when
/// every medication in it is completed; its completion time is the latest of
/// the individual completions.
fn medication_window_items(instances: &[DailyCareInstance]) -> Vec<TimelineItem> {
    let mut groups: Vec<(&str, Vec<&DailyCareInstance>)> = Vec::new();
    for inst in instances
        .iter()
        .filter(|i| i.item_type == ItemType::Medication)
    {
        match groups.iter_mut().find(|(id, _)| *id == inst.window_id) {
            Some((_, group)) => group.push(inst),
            None => groups.push((inst.window_id.as_str(), vec![inst])),
        }
    }

    groups
        .into_iter()
        .map(|(window_id, group)| {
            let scheduled_time = group
                .iter()
                .map(|i| i.scheduled_time)
                .min()
                .expect("window group is never empty");
            let all_completed = group
                .iter()
                .all(|i| i.status == InstanceStatus::Completed);
            let completed_time = if all_completed {
                group.iter().filter_map(|i| i.completed_at).max()
            } else {
                None
            };

            TimelineItem {
                id: format!("medication-{}", window_id),
                kind: TimelineItemKind::Medication,
                scheduled_time,
                completed_time,
                title: format!("{} medications", group[0].window_label),
                subtitle: String::new(),
                status: TimelineStatus::Upcoming,
                medication_ids: group.iter().map(|i| i.id.clone()).collect(),
                vital_types: Vec::new(),
                wellness_checks: Vec::new(),
                appointment_id: None,
                location: None,
            }
        })
        .collect()
}

fn wellness_item(
    kind: TimelineItemKind,
    title: &str,
    checks: &[&str],
    date: NaiveDate,
    time: NaiveTime,
    completed_time: Option<DateTime<Utc>>,
) -> TimelineItem {
    TimelineItem {
        id: kind.to_string(),
        kind,
        scheduled_time: at(date, time),
        completed_time,
        title: title.to_string(),
        subtitle: String::new(),
        status: TimelineStatus::Upcoming,
        medication_ids: Vec::new(),
        vital_types: Vec::new(),
        wellness_checks: checks.iter().map(|s| s.to_string()).collect(),
        appointment_id: None,
        location: None,
    }
}

fn at(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}
