//! Mapping between spreadsheet-shaped JSON records and the board models.
//!
//! Roster sheets are edited by hand, so column names vary in case and
//! language and cells may hold numbers where text is expected. A column is
//! taken from the first alias whose cell is non-empty.

use serde_json::{json, Map, Value};

use crate::clock::Timestamp;
use crate::error::{Error, Result};
use crate::models::{
    canonical_id, weekday_index, AuthorizedUser, DaySchedule, RemoteSettings, ScheduleConfig,
    Section, SettingValue, Student, StudentId, StudentStatus, UserRole, DAY_NAMES,
    DEFAULT_SCHOOL_NAME,
};

const ID_KEYS: &[&str] = &["id", "studentid", "ID", "رقم", "no"];
const NAME_EN_KEYS: &[&str] = &["nameEn", "nameen", "NameEn", "name"];
const NAME_AR_KEYS: &[&str] = &["nameAr", "namear", "NameAr", "الاسم"];
const GRADE_KEYS: &[&str] = &["grade", "Grade", "gradelevel"];
const SECTION_KEYS: &[&str] = &["section", "Section"];
const CLASS_KEYS: &[&str] = &["className", "classname", "Class", "class"];
const STATUS_KEYS: &[&str] = &["status", "Status"];
const TIME_KEYS: &[&str] = &["time", "Time"];

const DEFAULT_WINDOW_TIME: &str = "07:00";

/// Normalize a roster payload into students.
pub fn normalize_students(payload: &Value, now: Timestamp) -> Result<Vec<Student>> {
    let rows = payload
        .as_array()
        .ok_or_else(|| Error::InvalidPayload("roster response is not an array".to_string()))?;

    Ok(rows
        .iter()
        .filter_map(|row| match row.as_object() {
            Some(record) => Some(normalize_student(record, now)),
            None => {
                tracing::debug!("Skipping non-object roster row");
                None
            }
        })
        .collect())
}

fn normalize_student(record: &Map<String, Value>, now: Timestamp) -> Student {
    let grade = text_of(record, GRADE_KEYS).trim().to_string();
    let section = text_of(record, SECTION_KEYS)
        .parse::<Section>()
        .unwrap_or_else(|_| Section::from_grade(&grade));
    let time = non_empty(text_of(record, TIME_KEYS)).unwrap_or_else(|| now.to_rfc3339());

    Student {
        id: StudentId::new(canonical_id(&text_of(record, ID_KEYS))),
        name_en: text_of(record, NAME_EN_KEYS),
        name_ar: text_of(record, NAME_AR_KEYS),
        section,
        grade,
        class_name: text_of(record, CLASS_KEYS),
        status: StudentStatus::parse_lenient(&text_of(record, STATUS_KEYS)),
        time,
    }
}

/// Normalize a settings payload. `None` when it carries no schedule rows.
pub fn normalize_settings(payload: &Value) -> Option<RemoteSettings> {
    let record = payload.as_object()?;
    let rows = record
        .get("schedule")
        .and_then(|schedule| schedule.get("days"))
        .and_then(Value::as_array)?;

    let mut days = rows
        .iter()
        .enumerate()
        .map(|(index, row)| normalize_day(row, index))
        .collect::<Vec<_>>();
    days.sort_by_key(|day| day.day);

    let exam_mode = match record.get("examMode") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag == "ON",
        _ => false,
    };

    Some(RemoteSettings {
        exam_mode,
        school_name: non_empty(text_of(record, &["schoolName"]))
            .unwrap_or_else(|| DEFAULT_SCHOOL_NAME.to_string()),
        logo_url: text_of(record, &["logoUrl"]),
        drive_folder_id: text_of(record, &["driveFolderId"]),
        schedule: ScheduleConfig {
            days,
            enabled: true,
        },
    })
}

fn normalize_day(row: &Value, index: usize) -> DaySchedule {
    let empty = Map::new();
    let record = row.as_object().unwrap_or(&empty);
    let day = weekday_index(&text_of(record, &["Day"]))
        .unwrap_or_else(|| u8::try_from(index).unwrap_or(u8::MAX));

    DaySchedule {
        day,
        start: sanitize_time(&text_of(record, &["Starttime"])),
        end: sanitize_time(&text_of(record, &["Endtime"])),
        active: text_of(record, &["Status"]).trim().eq_ignore_ascii_case("ON"),
    }
}

/// Coerce a schedule cell into `HH:mm`.
///
/// Sheets export times as ISO datetimes, as `H:mm`, or with seconds.
fn sanitize_time(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return DEFAULT_WINDOW_TIME.to_string();
    }
    if let Some((_, time)) = value.split_once('T') {
        let mut parts = time.split(':');
        if let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) {
            return format!("{hours}:{minutes}");
        }
    }
    let bytes = value.as_bytes();
    if bytes.len() == 4
        && bytes[0].is_ascii_digit()
        && bytes[1] == b':'
        && bytes[2].is_ascii_digit()
        && bytes[3].is_ascii_digit()
    {
        return format!("0{value}");
    }
    value.chars().take(5).collect()
}

/// Normalize the authorized user list.
pub fn normalize_users(payload: &Value) -> Result<Vec<AuthorizedUser>> {
    let rows = payload
        .as_array()
        .ok_or_else(|| Error::InvalidPayload("user list response is not an array".to_string()))?;

    Ok(rows
        .iter()
        .filter_map(Value::as_object)
        .map(|record| AuthorizedUser {
            username: text_of(record, &["username", "Username"]).trim().to_string(),
            password: text_of(record, &["password", "Password"]).trim().to_string(),
            role: non_empty(text_of(record, &["role", "Role"]))
                .map_or(UserRole::User, |role| UserRole::parse_lenient(&role)),
        })
        .collect())
}

/// Encode a setting value the way the remote sheet stores it.
pub fn encode_setting(value: &SettingValue) -> Value {
    match value {
        SettingValue::Flag(flag) => json!(if *flag { "ON" } else { "OFF" }),
        SettingValue::Text(text) => Value::String(text.clone()),
        SettingValue::Schedule(schedule) => {
            json!({
                "enabled": true,
                "days": schedule
                    .days
                    .iter()
                    .map(|day| json!({
                        "Day": DAY_NAMES.get(usize::from(day.day)).copied().unwrap_or_default(),
                        "Starttime": day.start,
                        "Endtime": day.end,
                        "Status": if day.active { "ON" } else { "OFF" },
                    }))
                    .collect::<Vec<_>>(),
            })
        }
    }
}

/// Text of the first alias with a non-empty cell, or an empty string.
fn text_of(record: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(cell_text)
        .unwrap_or_default()
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => {
            let rendered = number.to_string();
            (rendered != "0").then_some(rendered)
        }
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn now() -> Timestamp {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00+03:00").unwrap()
    }

    #[test]
    fn students_accept_column_aliases() {
        let payload = json!([
            {
                "studentid": "0042",
                "NameEn": "Omar",
                "الاسم": "عمر",
                "Grade": 8,
                "Class": "8C",
                "Status": "on the way",
                "Time": "2026-03-02T08:55:00+03:00"
            },
            {
                "id": 7.0,
                "name": "Sara",
                "grade": "3",
                "section": "Elementary",
                "status": "YES"
            }
        ]);

        let students = normalize_students(&payload, now()).unwrap();

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].id.as_str(), "42");
        assert_eq!(students[0].name_en, "Omar");
        assert_eq!(students[0].name_ar, "عمر");
        assert_eq!(students[0].grade, "8");
        assert_eq!(students[0].section, Section::MiddleHigh);
        assert_eq!(students[0].class_name, "8C");
        assert_eq!(students[0].status, StudentStatus::OnTheWay);
        assert_eq!(students[1].id.as_str(), "7");
        assert_eq!(students[1].status, StudentStatus::Called);
        assert_eq!(students[1].time, now().to_rfc3339());
    }

    #[test]
    fn students_reject_non_array_payload() {
        let error = normalize_students(&json!({"error": "nope"}), now()).unwrap_err();
        assert!(error.to_string().contains("not an array"));
    }

    #[test]
    fn settings_map_named_days_and_sort() {
        let payload = json!({
            "examMode": "ON",
            "schoolName": "",
            "logoUrl": "https://cdn.example.com/logo.png",
            "schedule": {
                "days": [
                    {"Day": "Monday", "Starttime": "1899-12-30T08:00:00.000Z", "Endtime": "7:30", "Status": "ON"},
                    {"Day": "sunday", "Starttime": "09:15:00", "Endtime": "", "Status": "off"}
                ]
            }
        });

        let settings = normalize_settings(&payload).unwrap();

        assert!(settings.exam_mode);
        assert_eq!(settings.school_name, "EduDismiss");
        assert_eq!(settings.drive_folder_id, "");
        assert_eq!(
            settings.schedule.days,
            vec![
                DaySchedule::new(0, "09:15", "07:00", false),
                DaySchedule::new(1, "08:00", "07:30", true),
            ]
        );
    }

    #[test]
    fn settings_without_schedule_rows_are_ignored() {
        assert!(normalize_settings(&json!({"examMode": true})).is_none());
        assert!(normalize_settings(&json!([])).is_none());
    }

    #[test]
    fn unnamed_days_use_row_index() {
        let payload = json!({"schedule": {"days": [{"Status": "ON"}, {"Day": "?"}]}});
        let settings = normalize_settings(&payload).unwrap();
        assert_eq!(settings.schedule.days[0].day, 0);
        assert_eq!(settings.schedule.days[1].day, 1);
        assert!(!settings.exam_mode);
    }

    #[test]
    fn users_default_to_user_role() {
        let payload = json!([
            {"Username": " Gate ", "Password": " 42 ", "Role": "Admin"},
            {"username": "teacher", "password": "pw"}
        ]);

        let users = normalize_users(&payload).unwrap();

        assert_eq!(users[0].username, "Gate");
        assert_eq!(users[0].password, "42");
        assert_eq!(users[0].role, UserRole::Admin);
        assert_eq!(users[1].role, UserRole::User);
    }

    #[test]
    fn schedule_setting_is_encoded_as_sheet_rows() {
        let schedule = ScheduleConfig {
            days: vec![DaySchedule::new(1, "08:00", "12:00", true)],
            enabled: false,
        };

        let encoded = encode_setting(&SettingValue::Schedule(schedule));

        assert_eq!(
            encoded,
            json!({
                "enabled": true,
                "days": [{"Day": "Monday", "Starttime": "08:00", "Endtime": "12:00", "Status": "ON"}]
            })
        );
        assert_eq!(
            encode_setting(&SettingValue::Flag(false)),
            json!("OFF")
        );
    }
}
