use chrono::{DateTime, Local};
use edudismiss_core::models::{weekday_index, BoardSettings, Locale, Student, DAY_NAMES};
use edudismiss_core::roster::RosterStats;
use edudismiss_core::util::{is_http_url, normalize_text_option};
use edudismiss_core::{
    AppsScriptStore, BoardSnapshot, ClientConfig, Delivery, SyncContext, SyncSource, Timestamp,
};

use crate::error::CliError;
use crate::session_store::SessionFile;

pub type Board = SyncContext<AppsScriptStore>;

pub fn load_session() -> Result<SessionFile, CliError> {
    SessionFile::load().map_err(CliError::Config)
}

pub fn save_session(session: &SessionFile) -> Result<(), CliError> {
    let path = session.save().map_err(CliError::Config)?;
    tracing::debug!("Session saved to {}", path.display());
    Ok(())
}

pub fn open_store(
    endpoint: Option<String>,
    session: &SessionFile,
) -> Result<(AppsScriptStore, ClientConfig), CliError> {
    let config = ClientConfig::resolve(endpoint, session.endpoint_url.clone())?;
    let store = AppsScriptStore::new(config.endpoint_url.as_deref(), config.timings)?;
    Ok((store, config))
}

pub fn open_board(endpoint: Option<String>, session: &SessionFile) -> Result<Board, CliError> {
    let (store, config) = open_store(endpoint, session)?;
    Ok(SyncContext::new(store, config.timings))
}

/// Sync once, warning when the board had to fall back to local data.
pub async fn synced_board(endpoint: Option<String>, session: &SessionFile) -> Result<Board, CliError> {
    let board = open_board(endpoint, session)?;
    board.sync_now().await;
    if board.snapshot().await.source == SyncSource::Fallback {
        eprintln!("Warning: remote store unreachable, showing local defaults");
    }
    Ok(board)
}

pub fn require_admin(session: &SessionFile) -> Result<(), CliError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(CliError::AdminRequired)
    }
}

pub fn ensure_delivered(delivery: Delivery) -> Result<(), CliError> {
    match delivery {
        Delivery::Delivered => Ok(()),
        Delivery::Failed(reason) => Err(CliError::NotDelivered(reason)),
    }
}

pub fn normalize_required(value: String, what: &str) -> Result<String, CliError> {
    normalize_text_option(Some(value))
        .ok_or_else(|| CliError::InvalidArgument(format!("{what} cannot be empty")))
}

/// An empty value clears the URL; anything else must be http(s).
pub fn normalize_url_argument(value: &str) -> Result<String, CliError> {
    let value = value.trim();
    if value.is_empty() || is_http_url(value) {
        Ok(value.to_string())
    } else {
        Err(CliError::InvalidArgument(format!(
            "'{value}' must start with http:// or https://"
        )))
    }
}

/// Accept a weekday name (any case) or its index, Sunday = 0.
pub fn parse_day(raw: &str) -> Result<u8, CliError> {
    let raw = raw.trim();
    if let Ok(index) = raw.parse::<u8>() {
        if usize::from(index) < DAY_NAMES.len() {
            return Ok(index);
        }
    }
    weekday_index(raw).ok_or_else(|| {
        CliError::InvalidArgument(format!(
            "'{raw}' is not a weekday name or an index from 0 (Sunday) to 6"
        ))
    })
}

pub fn format_board_header(snapshot: &BoardSnapshot) -> Vec<String> {
    let source = match snapshot.source {
        SyncSource::Live => "LIVE",
        SyncSource::Fallback => "OFFLINE",
    };
    let window = if snapshot.dismissal_open {
        "dismissal open"
    } else {
        "dismissal paused"
    };
    let last_sync = snapshot.last_sync.map_or_else(
        || "never".to_string(),
        |at| at.with_timezone(&Local).format("%H:%M:%S").to_string(),
    );
    let stats = RosterStats::from_roster(&snapshot.roster);

    let mut lines = vec![
        format!(
            "{}  |  {source}  |  {window}  |  last sync {last_sync}",
            snapshot.settings.school_name
        ),
        format!(
            "{} students: {} in class, {} called, {} on the way, {} dismissed",
            stats.total, stats.in_class, stats.called, stats.on_the_way, stats.dismissed
        ),
    ];
    if snapshot.settings.exam_mode {
        lines.push("EXAM MODE: classrooms show every called student".to_string());
    }
    lines
}

pub fn format_student_lines(students: &[&Student], locale: Locale, now: Timestamp) -> Vec<String> {
    students
        .iter()
        .map(|student| {
            let name = preview(student.display_name(locale), 30);
            let changed = format_change_time(&student.time, now);
            format!(
                "{:<8}  {name:<30}  {:<11}  {:<6}  {:<10}  {changed}",
                student.id.to_string(),
                student.section.as_str(),
                student.class_name,
                student.status.as_str(),
            )
        })
        .collect()
}

pub fn format_settings_lines(settings: &BoardSettings) -> Vec<String> {
    let or_unset = |value: &str| {
        if value.is_empty() {
            "(not set)".to_string()
        } else {
            value.to_string()
        }
    };
    let mut lines = vec![
        format!("School name:   {}", settings.school_name),
        format!("Logo URL:      {}", or_unset(&settings.logo_url)),
        format!("Drive folder:  {}", or_unset(&settings.drive_folder_id)),
        format!(
            "Exam mode:     {}",
            if settings.exam_mode { "on" } else { "off" }
        ),
        "Schedule:".to_string(),
    ];
    lines.extend(settings.schedule.days.iter().map(|day| {
        let name = DAY_NAMES.get(usize::from(day.day)).copied().unwrap_or("?");
        if day.active {
            format!("  {name:<10} {} - {}", day.start, day.end)
        } else {
            format!("  {name:<10} off")
        }
    }));
    lines
}

/// Relative age of a status change, or the raw value when it is not RFC 3339.
pub fn format_change_time(raw: &str, now: Timestamp) -> String {
    let Ok(changed) = DateTime::parse_from_rfc3339(raw.trim()) else {
        return raw.trim().to_string();
    };
    let seconds = now.signed_duration_since(changed).num_seconds().max(0);
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

pub fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let mut truncated = collapsed
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}
