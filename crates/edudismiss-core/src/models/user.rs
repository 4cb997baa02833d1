//! Authorized board users

use std::fmt;

use serde::{Deserialize, Serialize};

const FALLBACK_USERNAME: &str = "admin";
const FALLBACK_PASSWORD: &str = "123";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    /// Parse a role cell; anything other than `Admin` is a plain user.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

impl AuthorizedUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Built-in credential that keeps the board reachable when the remote
    /// user list is not.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            username: FALLBACK_USERNAME.to_string(),
            password: FALLBACK_PASSWORD.to_string(),
            role: UserRole::Admin,
        }
    }

    /// Case-insensitive username and exact (trimmed) password match.
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username.trim().to_lowercase() == username.trim().to_lowercase()
            && self.password.trim() == password.trim()
    }
}

impl fmt::Debug for AuthorizedUser {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthorizedUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_debug_redacts_password() {
        let user = AuthorizedUser {
            username: "gate".to_string(),
            password: "hunter2".to_string(),
            role: UserRole::User,
        };
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn matches_ignores_username_case_and_padding() {
        let user = AuthorizedUser::fallback();
        assert!(user.matches(" Admin ", "123 "));
        assert!(!user.matches("admin", "1234"));
    }

    #[test]
    fn role_parse_defaults_to_user() {
        assert_eq!(UserRole::parse_lenient("ADMIN"), UserRole::Admin);
        assert_eq!(UserRole::parse_lenient("teacher"), UserRole::User);
    }
}
