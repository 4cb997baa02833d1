//! Student model

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Locale;

/// Student identifier as provided by the remote roster.
///
/// The raw value is kept for display, while equality and hashing use the
/// canonical form so `"007"`, `"7"` and `"7.0"` name the same student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw identifier as stored
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier used for equality
    #[must_use]
    pub fn canonical(&self) -> String {
        canonical_id(&self.0)
    }
}

impl PartialEq for StudentId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for StudentId {}

impl Hash for StudentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StudentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Canonicalize a raw student id: trim, drop a spreadsheet `.0` suffix and
/// strip leading zeros. An all-zero id deliberately keeps a single `"0"`
/// instead of becoming empty, so it never matches a blank id.
#[must_use]
pub fn canonical_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    let stripped = trimmed.trim_start_matches('0');
    if stripped.is_empty() && !trimmed.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Dismissal state of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentStatus {
    #[default]
    InClass,
    Called,
    OnTheWay,
    Dismissed,
}

impl StudentStatus {
    pub const ALL: [Self; 4] = [Self::InClass, Self::Called, Self::OnTheWay, Self::Dismissed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InClass => "IN_CLASS",
            Self::Called => "CALLED",
            Self::OnTheWay => "ON_THE_WAY",
            Self::Dismissed => "DISMISSED",
        }
    }

    /// Interpret the loosely typed status cells found in roster sheets.
    ///
    /// Unknown values fall back to `InClass`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_uppercase();
        match normalized.as_str() {
            "CALLED" | "TRUE" | "1" | "YES" => Self::Called,
            "ON_THE_WAY" | "ONTHEWAY" | "WAY" | "2" => Self::OnTheWay,
            "DISMISSED" | "DONE" | "3" => Self::Dismissed,
            _ => Self::InClass,
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown student status '{s}'"))
    }
}

/// School section a student belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Section {
    #[default]
    Elementary,
    MiddleHigh,
}

impl Section {
    /// Derive the section from a grade label when the roster has no section
    /// column: grades above 6 are `MiddleHigh`.
    #[must_use]
    pub fn from_grade(grade: &str) -> Self {
        match leading_integer(grade) {
            Some(value) if value > 6 => Self::MiddleHigh,
            _ => Self::Elementary,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elementary => "Elementary",
            Self::MiddleHigh => "MiddleHigh",
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Elementary" => Ok(Self::Elementary),
            "MiddleHigh" => Ok(Self::MiddleHigh),
            other => Err(format!("unknown section '{other}'")),
        }
    }
}

fn leading_integer(value: &str) -> Option<i64> {
    let value = value.trim();
    let (sign, digits) = value
        .strip_prefix('-')
        .map_or((1, value), |rest| (-1, rest));
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|parsed| sign * parsed)
}

/// A student on the dismissal board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name_en: String,
    pub name_ar: String,
    pub section: Section,
    pub grade: String,
    pub class_name: String,
    pub status: StudentStatus,
    /// ISO timestamp of the last status change
    pub time: String,
}

impl Student {
    /// Name in the requested locale, falling back to the other one when empty.
    #[must_use]
    pub fn display_name(&self, locale: Locale) -> &str {
        let (preferred, other) = match locale {
            Locale::En => (&self.name_en, &self.name_ar),
            Locale::Ar => (&self.name_ar, &self.name_en),
        };
        if preferred.trim().is_empty() {
            other
        } else {
            preferred
        }
    }
}
