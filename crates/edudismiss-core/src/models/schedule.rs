//! Weekly dismissal schedule and the window predicate.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

/// English weekday names indexed from Sunday = 0.
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const DEFAULT_START: &str = "07:00";
const DEFAULT_END: &str = "16:00";

/// Dismissal window for one weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    /// Weekday index, Sunday = 0
    pub day: u8,
    /// Window start as zero-padded `HH:mm`
    pub start: String,
    /// Window end as zero-padded `HH:mm`
    pub end: String,
    pub active: bool,
}

impl DaySchedule {
    pub fn new(day: u8, start: impl Into<String>, end: impl Into<String>, active: bool) -> Self {
        Self {
            day,
            start: start.into(),
            end: end.into(),
            active,
        }
    }

    /// Whether `hhmm` lies inside this day's window, bounds inclusive.
    ///
    /// Plain string comparison is correct because both sides are fixed-width
    /// zero-padded `HH:mm`.
    #[must_use]
    pub fn contains(&self, hhmm: &str) -> bool {
        self.active && self.start.as_str() <= hhmm && hhmm <= self.end.as_str()
    }
}

/// Seven-day dismissal schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub days: Vec<DaySchedule>,
    pub enabled: bool,
}

impl Default for ScheduleConfig {
    /// Monday to Friday 07:00-16:00, weekends inactive.
    fn default() -> Self {
        Self {
            days: (0..7)
                .map(|day| DaySchedule::new(day, DEFAULT_START, DEFAULT_END, (1..=5).contains(&day)))
                .collect(),
            enabled: true,
        }
    }
}

impl ScheduleConfig {
    /// Entry for a weekday index
    #[must_use]
    pub fn day(&self, weekday: u8) -> Option<&DaySchedule> {
        self.days.iter().find(|entry| entry.day == weekday)
    }

    /// Return a copy with the entry for `entry.day` replaced (or appended).
    #[must_use]
    pub fn with_day(&self, entry: DaySchedule) -> Self {
        let mut next = self.clone();
        match next.days.iter_mut().find(|existing| existing.day == entry.day) {
            Some(existing) => *existing = entry,
            None => {
                next.days.push(entry);
                next.days.sort_by_key(|day| day.day);
            }
        }
        next
    }

    /// Structural, order-sensitive comparison of the per-day entries.
    ///
    /// The top-level `enabled` flag does not take part.
    #[must_use]
    pub fn same_days(&self, other: &Self) -> bool {
        self.days == other.days
    }

    /// Whether dismissal is permitted at `at`, read as local wall-clock time.
    #[must_use]
    pub fn is_open_at<T: Datelike + Timelike>(&self, at: &T) -> bool {
        let Ok(weekday) = u8::try_from(at.weekday().num_days_from_sunday()) else {
            return false;
        };
        self.day(weekday)
            .is_some_and(|entry| entry.contains(&format_hhmm(at)))
    }

    /// Check the seven-entry invariant and the `HH:mm` format of every bound.
    pub fn validate(&self) -> Result<(), String> {
        if self.days.len() != 7 {
            return Err(format!("expected 7 days, found {}", self.days.len()));
        }
        let mut seen = [false; 7];
        for entry in &self.days {
            let Some(slot) = seen.get_mut(usize::from(entry.day)) else {
                return Err(format!("day index {} is out of range 0-6", entry.day));
            };
            if *slot {
                return Err(format!("day index {} appears twice", entry.day));
            }
            *slot = true;
            for value in [&entry.start, &entry.end] {
                if !is_valid_hhmm(value) {
                    return Err(format!("'{value}' is not a valid HH:mm time"));
                }
            }
            if entry.start > entry.end {
                return Err(format!(
                    "{} starts after it ends ({} > {})",
                    DAY_NAMES[usize::from(entry.day)],
                    entry.start,
                    entry.end
                ));
            }
        }
        Ok(())
    }
}

/// Format the wall-clock part of an instant as zero-padded `HH:mm`.
pub fn format_hhmm<T: Timelike>(at: &T) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}

/// Whether `value` is a zero-padded 24-hour `HH:mm` time.
pub fn is_valid_hhmm(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| {
        value
            .get(range)
            .filter(|part| part.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|part| part.parse::<u8>().ok())
    };
    matches!((digits(0..2), digits(3..5)), (Some(hour), Some(minute)) if hour < 24 && minute < 60)
}

/// Weekday index for an English day name, case-insensitive.
pub fn weekday_index(name: &str) -> Option<u8> {
    let name = name.trim();
    DAY_NAMES
        .iter()
        .position(|day| day.eq_ignore_ascii_case(name))
        .and_then(|index| u8::try_from(index).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(date: (i32, u32, u32), hour: u32, minute: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    // 2026-03-02 is a Monday, 2026-03-01 a Sunday.
    const MONDAY: (i32, u32, u32) = (2026, 3, 2);
    const SUNDAY: (i32, u32, u32) = (2026, 3, 1);

    fn monday_morning() -> ScheduleConfig {
        ScheduleConfig::default().with_day(DaySchedule::new(1, "08:00", "12:00", true))
    }

    #[test]
    fn default_schedule_covers_weekdays() {
        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.days.len(), 7);
        assert!(schedule.validate().is_ok());
        assert!(!schedule.day(0).unwrap().active);
        assert!(schedule.day(3).unwrap().active);
        assert!(!schedule.day(6).unwrap().active);
    }

    #[test]
    fn open_inside_window_closed_after() {
        let schedule = monday_morning();
        assert!(schedule.is_open_at(&at(MONDAY, 9, 0)));
        assert!(!schedule.is_open_at(&at(MONDAY, 13, 0)));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let schedule = monday_morning();
        assert!(schedule.is_open_at(&at(MONDAY, 8, 0)));
        assert!(schedule.is_open_at(&at(MONDAY, 12, 0)));
        assert!(!schedule.is_open_at(&at(MONDAY, 7, 59)));
        assert!(!schedule.is_open_at(&at(MONDAY, 12, 1)));
    }

    #[test]
    fn inactive_day_is_always_closed() {
        let schedule =
            ScheduleConfig::default().with_day(DaySchedule::new(0, "00:00", "23:59", false));
        assert!(!schedule.is_open_at(&at(SUNDAY, 10, 0)));
        assert!(!schedule.is_open_at(&at(SUNDAY, 0, 0)));
    }

    #[test]
    fn missing_day_is_closed() {
        let schedule = ScheduleConfig {
            days: vec![DaySchedule::new(2, "00:00", "23:59", true)],
            enabled: true,
        };
        assert!(!schedule.is_open_at(&at(MONDAY, 10, 0)));
    }

    #[test]
    fn same_days_ignores_enabled_flag_but_not_order() {
        let schedule = ScheduleConfig::default();
        let disabled = ScheduleConfig {
            enabled: false,
            ..schedule.clone()
        };
        assert!(schedule.same_days(&disabled));

        let mut reversed = schedule.clone();
        reversed.days.reverse();
        assert!(!schedule.same_days(&reversed));
    }

    #[test]
    fn validate_rejects_bad_entries() {
        let mut schedule = ScheduleConfig::default();
        schedule.days[1].start = "7:00".to_string();
        assert!(schedule.validate().is_err());

        let mut schedule = ScheduleConfig::default();
        schedule.days[2].day = 1;
        assert!(schedule.validate().unwrap_err().contains("twice"));

        let mut schedule = ScheduleConfig::default();
        schedule.days[3].start = "17:00".to_string();
        assert!(schedule.validate().unwrap_err().contains("starts after"));

        let mut schedule = ScheduleConfig::default();
        schedule.days.pop();
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn hhmm_format_checks() {
        assert!(is_valid_hhmm("00:00"));
        assert!(is_valid_hhmm("23:59"));
        assert!(!is_valid_hhmm("24:00"));
        assert!(!is_valid_hhmm("12:60"));
        assert!(!is_valid_hhmm("1:30"));
        assert!(!is_valid_hhmm("ab:cd"));
    }

    #[test]
    fn weekday_index_matches_names() {
        assert_eq!(weekday_index("monday"), Some(1));
        assert_eq!(weekday_index(" SATURDAY "), Some(6));
        assert_eq!(weekday_index("Funday"), None);
    }
}
