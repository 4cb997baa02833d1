//! Board settings model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ScheduleConfig;

/// School name shown when the remote store has none
pub const DEFAULT_SCHOOL_NAME: &str = "EduDismiss";

/// Display language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "EN")]
    En,
    #[serde(rename = "AR")]
    Ar,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EN" => Ok(Self::En),
            "AR" => Ok(Self::Ar),
            other => Err(format!("unknown locale '{other}' (expected EN or AR)")),
        }
    }
}

/// Board settings shared by every client of the same school
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSettings {
    /// Classrooms see every called student regardless of their filters
    pub exam_mode: bool,
    pub school_name: String,
    pub logo_url: String,
    /// Remote folder that receives uploaded assets
    pub drive_folder_id: String,
    pub schedule: ScheduleConfig,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            exam_mode: false,
            school_name: DEFAULT_SCHOOL_NAME.to_string(),
            logo_url: String::new(),
            drive_folder_id: String::new(),
            schedule: ScheduleConfig::default(),
        }
    }
}

/// Settings snapshot as read from the remote store.
///
/// Empty strings mean "not set remotely".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSettings {
    pub exam_mode: bool,
    pub school_name: String,
    pub logo_url: String,
    pub drive_folder_id: String,
    pub schedule: ScheduleConfig,
}

/// Settings that can be mutated locally and pushed to the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingField {
    ExamMode,
    SchoolName,
    LogoUrl,
    DriveFolderId,
    Schedule,
}

impl SettingField {
    pub const ALL: [Self; 5] = [
        Self::ExamMode,
        Self::SchoolName,
        Self::LogoUrl,
        Self::DriveFolderId,
        Self::Schedule,
    ];

    /// Setting name used on the wire
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::ExamMode => "exam_mode",
            Self::SchoolName => "schoolName",
            Self::LogoUrl => "logoUrl",
            Self::DriveFolderId => "driveFolderId",
            Self::Schedule => "schedule",
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Value pushed for a single setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Flag(bool),
    Text(String),
    Schedule(ScheduleConfig),
}

/// Partial branding edit; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandingUpdate {
    pub school_name: Option<String>,
    pub logo_url: Option<String>,
    pub drive_folder_id: Option<String>,
}

impl BrandingUpdate {
    /// Present fields in dispatch order
    #[must_use]
    pub fn fields(&self) -> Vec<(SettingField, String)> {
        [
            (SettingField::SchoolName, &self.school_name),
            (SettingField::LogoUrl, &self.logo_url),
            (SettingField::DriveFolderId, &self.drive_folder_id),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|value| (field, value)))
        .collect()
    }
}
