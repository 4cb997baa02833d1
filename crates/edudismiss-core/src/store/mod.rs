//! Remote store abstraction.
//!
//! The sync engine consumes the remote source of record through
//! [`RemoteStore`]. Reads return errors; writes are best-effort and report a
//! [`Delivery`] that callers are free to ignore.

mod apps_script;
mod memory;
mod normalize;

use std::future::Future;

pub use apps_script::AppsScriptStore;
pub use memory::MemoryStore;
pub use normalize::{encode_setting, normalize_settings, normalize_students, normalize_users};

use crate::error::Result;
use crate::models::{
    AuthorizedUser, RemoteSettings, SettingField, SettingValue, Student, StudentId, StudentStatus,
};

/// Outcome of a best-effort write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The request reached the remote store. Durability is not implied.
    Delivered,
    Failed(String),
}

impl Delivery {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Keep the first failure of two sequential deliveries.
    #[must_use]
    pub fn and(self, next: Self) -> Self {
        match self {
            Self::Delivered => next,
            failed @ Self::Failed(_) => failed,
        }
    }
}

impl<E: std::fmt::Display> From<std::result::Result<(), E>> for Delivery {
    fn from(result: std::result::Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(error) => Self::Failed(error.to_string()),
        }
    }
}

/// Source of record for the roster, settings and users.
pub trait RemoteStore: Send + Sync + 'static {
    fn fetch_roster(&self) -> impl Future<Output = Result<Vec<Student>>> + Send;

    /// `Ok(None)` when the store answered but holds no usable settings.
    fn fetch_settings(&self) -> impl Future<Output = Result<Option<RemoteSettings>>> + Send;

    fn dispatch_status(
        &self,
        id: &StudentId,
        status: StudentStatus,
    ) -> impl Future<Output = Delivery> + Send;

    fn dispatch_setting(
        &self,
        field: SettingField,
        value: &SettingValue,
    ) -> impl Future<Output = Delivery> + Send;

    /// Upload an asset into `target_folder`, returning its public URL.
    fn upload_asset(
        &self,
        bytes: &[u8],
        target_folder: &str,
        filename: &str,
    ) -> impl Future<Output = Option<String>> + Send;

    fn reset_all(&self) -> impl Future<Output = Delivery> + Send;

    /// Users allowed to sign in. Falls back to the built-in credential when
    /// the list cannot be read.
    fn list_authorized_users(&self) -> impl Future<Output = Vec<AuthorizedUser>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_and_keeps_first_failure() {
        let combined = Delivery::Failed("first".to_string()).and(Delivery::Failed("second".into()));
        assert_eq!(combined, Delivery::Failed("first".to_string()));
        assert_eq!(
            Delivery::Delivered.and(Delivery::Failed("late".to_string())),
            Delivery::Failed("late".to_string())
        );
        assert!(Delivery::Delivered.and(Delivery::Delivered).is_delivered());
    }

    #[test]
    fn delivery_from_result() {
        let ok: std::result::Result<(), String> = Ok(());
        assert_eq!(Delivery::from(ok), Delivery::Delivered);
        let err: std::result::Result<(), String> = Err("offline".to_string());
        assert_eq!(Delivery::from(err), Delivery::Failed("offline".to_string()));
    }
}
