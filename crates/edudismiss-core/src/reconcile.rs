//! Settings reconciliation with per-field cooldown.
//!
//! Local settings edits are pushed without waiting for the remote store, so
//! a poll that started before the write landed can carry the old value.
//! Each field therefore ignores remote values for a cooldown window after
//! its last local mutation.

use std::collections::HashMap;
use std::time::Duration;

use crate::clock::Timestamp;
use crate::models::{BoardSettings, RemoteSettings, SettingField};
use crate::util::to_time_delta;

/// Instant of the last local mutation per setting field.
#[derive(Debug, Clone, Default)]
pub struct FieldTimestamps {
    stamps: HashMap<SettingField, Timestamp>,
}

impl FieldTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stamp(&mut self, field: SettingField, now: Timestamp) {
        self.stamps.insert(field, now);
    }

    pub fn last(&self, field: SettingField) -> Option<Timestamp> {
        self.stamps.get(&field).copied()
    }

    /// Whether a local edit to `field` is recent enough to win over a fetch.
    ///
    /// A field that was never edited locally is never in cooldown.
    pub fn in_cooldown(&self, field: SettingField, now: Timestamp, cooldown: Duration) -> bool {
        self.last(field)
            .is_some_and(|last| now.signed_duration_since(last) <= to_time_delta(cooldown))
    }
}

/// Merge `fetched` into `local`, field by field, and return the adopted fields.
///
/// A field adopts the fetched value only when it is out of cooldown, the
/// value differs and (for text fields) the fetched value is not empty.
/// Schedules are compared per day, in order. Timestamps are never touched.
pub fn reconcile_settings(
    local: &mut BoardSettings,
    fetched: &RemoteSettings,
    stamps: &FieldTimestamps,
    now: Timestamp,
    cooldown: Duration,
) -> Vec<SettingField> {
    let mut adopted = Vec::new();
    let open = |field| !stamps.in_cooldown(field, now, cooldown);

    if open(SettingField::ExamMode) && local.exam_mode != fetched.exam_mode {
        local.exam_mode = fetched.exam_mode;
        adopted.push(SettingField::ExamMode);
    }

    for (field, current, incoming) in [
        (
            SettingField::SchoolName,
            &mut local.school_name,
            &fetched.school_name,
        ),
        (SettingField::LogoUrl, &mut local.logo_url, &fetched.logo_url),
        (
            SettingField::DriveFolderId,
            &mut local.drive_folder_id,
            &fetched.drive_folder_id,
        ),
    ] {
        if open(field) && !incoming.is_empty() && current != incoming {
            current.clone_from(incoming);
            adopted.push(field);
        }
    }

    if open(SettingField::Schedule) && !local.schedule.same_days(&fetched.schedule) {
        local.schedule = fetched.schedule.clone();
        adopted.push(SettingField::Schedule);
    }

    if !adopted.is_empty() {
        tracing::info!(?adopted, "Adopted remote settings");
    }
    adopted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DaySchedule, ScheduleConfig};
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    const COOLDOWN: Duration = Duration::from_secs(5);

    fn t0() -> Timestamp {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00+03:00").unwrap()
    }

    fn at_ms(ms: u64) -> Timestamp {
        t0() + to_time_delta(Duration::from_millis(ms))
    }

    fn remote_from(local: &BoardSettings) -> RemoteSettings {
        RemoteSettings {
            exam_mode: local.exam_mode,
            school_name: local.school_name.clone(),
            logo_url: local.logo_url.clone(),
            drive_folder_id: local.drive_folder_id.clone(),
            schedule: local.schedule.clone(),
        }
    }

    #[test]
    fn unstamped_fields_adopt_differing_values() {
        let mut local = BoardSettings::default();
        let fetched = RemoteSettings {
            exam_mode: true,
            school_name: "Al Noor School".to_string(),
            logo_url: "https://cdn.example.com/logo.png".to_string(),
            drive_folder_id: "folder-9".to_string(),
            schedule: ScheduleConfig::default()
                .with_day(DaySchedule::new(1, "08:00", "12:00", true)),
        };

        let adopted =
            reconcile_settings(&mut local, &fetched, &FieldTimestamps::new(), t0(), COOLDOWN);

        assert_eq!(adopted, SettingField::ALL.to_vec());
        assert_eq!(remote_from(&local), fetched);
    }

    #[test]
    fn school_name_respects_cooldown() {
        let mut local = BoardSettings {
            school_name: "Local Edit".to_string(),
            ..BoardSettings::default()
        };
        let mut stamps = FieldTimestamps::new();
        stamps.stamp(SettingField::SchoolName, t0());
        let fetched = RemoteSettings {
            school_name: "Stale Remote".to_string(),
            ..remote_from(&local)
        };

        let adopted = reconcile_settings(&mut local, &fetched, &stamps, at_ms(2_000), COOLDOWN);
        assert!(adopted.is_empty());
        assert_eq!(local.school_name, "Local Edit");

        let adopted = reconcile_settings(&mut local, &fetched, &stamps, at_ms(6_000), COOLDOWN);
        assert_eq!(adopted, vec![SettingField::SchoolName]);
        assert_eq!(local.school_name, "Stale Remote");
    }

    #[test]
    fn cooldown_boundary_is_inclusive() {
        let mut local = BoardSettings::default();
        let mut stamps = FieldTimestamps::new();
        stamps.stamp(SettingField::ExamMode, t0());
        let fetched = RemoteSettings {
            exam_mode: true,
            ..remote_from(&local)
        };

        assert!(reconcile_settings(&mut local, &fetched, &stamps, at_ms(5_000), COOLDOWN).is_empty());
        assert!(!local.exam_mode);

        let adopted = reconcile_settings(&mut local, &fetched, &stamps, at_ms(5_001), COOLDOWN);
        assert_eq!(adopted, vec![SettingField::ExamMode]);
        assert!(local.exam_mode);
    }

    #[test]
    fn every_field_in_cooldown_keeps_local_values() {
        let mut local = BoardSettings::default();
        let before = local.clone();
        let mut stamps = FieldTimestamps::new();
        for field in SettingField::ALL {
            stamps.stamp(field, t0());
        }
        let fetched = RemoteSettings {
            exam_mode: true,
            school_name: "Remote".to_string(),
            logo_url: "https://remote/logo.png".to_string(),
            drive_folder_id: "remote-folder".to_string(),
            schedule: ScheduleConfig::default()
                .with_day(DaySchedule::new(6, "09:00", "10:00", true)),
        };

        let adopted = reconcile_settings(&mut local, &fetched, &stamps, at_ms(4_999), COOLDOWN);

        assert!(adopted.is_empty());
        assert_eq!(local, before);
    }

    #[test]
    fn empty_remote_text_never_clears_local_value() {
        let mut local = BoardSettings {
            logo_url: "https://cdn.example.com/logo.png".to_string(),
            ..BoardSettings::default()
        };
        let fetched = RemoteSettings {
            logo_url: String::new(),
            ..remote_from(&local)
        };

        let adopted =
            reconcile_settings(&mut local, &fetched, &FieldTimestamps::new(), t0(), COOLDOWN);

        assert!(adopted.is_empty());
        assert_eq!(local.logo_url, "https://cdn.example.com/logo.png");
    }

    #[test]
    fn equal_schedule_is_not_adopted_and_stamps_untouched() {
        let mut local = BoardSettings::default();
        let fetched = RemoteSettings {
            schedule: ScheduleConfig {
                enabled: false,
                ..ScheduleConfig::default()
            },
            ..remote_from(&local)
        };
        let stamps = FieldTimestamps::new();

        let adopted = reconcile_settings(&mut local, &fetched, &stamps, t0(), COOLDOWN);

        assert!(adopted.is_empty());
        assert!(local.schedule.enabled);
        assert!(stamps.last(SettingField::Schedule).is_none());
    }
}
