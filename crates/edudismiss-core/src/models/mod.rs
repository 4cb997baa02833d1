//! Data models for EduDismiss

mod schedule;
mod settings;
mod student;
mod user;

pub use schedule::{
    format_hhmm, is_valid_hhmm, weekday_index, DaySchedule, ScheduleConfig, DAY_NAMES,
};
pub use settings::{
    BoardSettings, BrandingUpdate, Locale, RemoteSettings, SettingField, SettingValue,
    DEFAULT_SCHOOL_NAME,
};
pub use student::{canonical_id, Section, Student, StudentId, StudentStatus};
pub use user::{AuthorizedUser, UserRole};
