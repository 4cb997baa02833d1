//! Client-local session state persisted between CLI runs.

use std::path::{Path, PathBuf};

use edudismiss_core::models::{AuthorizedUser, Locale, UserRole};
use edudismiss_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionFile {
    #[serde(default = "default_session_version")]
    pub version: u32,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

/// Signed-in user. The password is never written to disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub username: String,
    pub role: UserRole,
}

impl From<&AuthorizedUser> for SessionUser {
    fn from(user: &AuthorizedUser) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
        }
    }
}

const fn default_session_version() -> u32 {
    1
}

pub fn default_session_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("edudismiss").join(SESSION_FILE_NAME))
        .ok_or_else(|| "Failed to resolve the user config directory".to_string())
}

impl SessionFile {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_session_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read session at {}: {}", path.display(), error))?;
        let mut session = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse session at {}: {}", path.display(), error))?;
        session.normalize();
        Ok(session)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_session_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create session directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize session: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write session at {}: {}", path.display(), error))
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.role == UserRole::Admin)
    }

    pub fn sign_in(&mut self, user: &AuthorizedUser) {
        self.user = Some(SessionUser::from(user));
    }

    pub fn sign_out(&mut self) -> Option<SessionUser> {
        self.user.take()
    }

    fn normalize(&mut self) {
        self.endpoint_url = normalize_text_option(self.endpoint_url.take());
        if self
            .user
            .as_ref()
            .is_some_and(|user| user.username.trim().is_empty())
        {
            self.user = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionFile::load_from_path(&dir.path().join("session.json")).unwrap();

        assert_eq!(session.locale, Locale::En);
        assert_eq!(session.endpoint_url, None);
        assert_eq!(session.user, None);
        assert!(!session.is_admin());
    }

    #[test]
    fn save_and_load_keeps_user_without_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let mut session = SessionFile {
            locale: Locale::Ar,
            endpoint_url: Some("  https://script.example.com/exec ".to_string()),
            ..SessionFile::default()
        };
        session.sign_in(&AuthorizedUser::fallback());

        session.save_to_path(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let loaded = SessionFile::load_from_path(&path).unwrap();

        assert!(!raw.contains("\"password\""));
        assert_eq!(loaded.locale, Locale::Ar);
        assert_eq!(
            loaded.endpoint_url.as_deref(),
            Some("https://script.example.com/exec")
        );
        assert!(loaded.is_admin());
    }

    #[test]
    fn sign_out_clears_user() {
        let mut session = SessionFile::default();
        session.sign_in(&AuthorizedUser::fallback());

        let previous = session.sign_out();

        assert_eq!(previous.map(|user| user.username), Some("admin".to_string()));
        assert_eq!(session.user, None);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let error = SessionFile::load_from_path(&path).unwrap_err();

        assert!(error.contains("Failed to parse session"));
    }
}
