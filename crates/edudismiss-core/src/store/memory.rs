//! In-process remote store used by tests and offline demos.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::{Delivery, RemoteStore};
use crate::error::{Error, Result};
use crate::models::{
    AuthorizedUser, RemoteSettings, SettingField, SettingValue, Student, StudentId, StudentStatus,
};

#[derive(Debug, Default)]
struct MemoryState {
    roster: Vec<Student>,
    settings: Option<RemoteSettings>,
    users: Vec<AuthorizedUser>,
    fail_reads: bool,
    fail_writes: bool,
    roster_fetches: usize,
    settings_fetches: usize,
    status_dispatches: Vec<(StudentId, StudentStatus)>,
    setting_dispatches: Vec<(SettingField, SettingValue)>,
    uploads: Vec<(String, String)>,
    resets: usize,
}

/// Remote store kept in memory. Writes are recorded, not applied, except
/// `reset_all` which returns every student to `IN_CLASS`.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    gate: watch::Sender<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            gate: watch::Sender::new(true),
        }
    }
}

impl MemoryStore {
    pub fn new(roster: Vec<Student>, settings: Option<RemoteSettings>) -> Self {
        let store = Self::default();
        {
            let mut state = store.lock();
            state.roster = roster;
            state.settings = settings;
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_roster(&self, roster: Vec<Student>) {
        self.lock().roster = roster;
    }

    pub fn set_settings(&self, settings: Option<RemoteSettings>) {
        self.lock().settings = settings;
    }

    pub fn set_users(&self, users: Vec<AuthorizedUser>) {
        self.lock().users = users;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make roster fetches wait until [`MemoryStore::release_fetches`].
    pub fn hold_fetches(&self) {
        self.gate.send_replace(false);
    }

    pub fn release_fetches(&self) {
        self.gate.send_replace(true);
    }

    pub fn roster_fetches(&self) -> usize {
        self.lock().roster_fetches
    }

    pub fn settings_fetches(&self) -> usize {
        self.lock().settings_fetches
    }

    pub fn status_dispatches(&self) -> Vec<(StudentId, StudentStatus)> {
        self.lock().status_dispatches.clone()
    }

    pub fn setting_dispatches(&self) -> Vec<(SettingField, SettingValue)> {
        self.lock().setting_dispatches.clone()
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.lock().uploads.clone()
    }

    pub fn resets(&self) -> usize {
        self.lock().resets
    }

    fn write_outcome(&self) -> Delivery {
        if self.lock().fail_writes {
            Delivery::Failed("remote store unreachable".to_string())
        } else {
            Delivery::Delivered
        }
    }
}

impl RemoteStore for MemoryStore {
    async fn fetch_roster(&self) -> Result<Vec<Student>> {
        self.lock().roster_fetches += 1;
        let mut gate = self.gate.subscribe();
        // The sender lives as long as `self`, so the wait cannot fail.
        let _ = gate.wait_for(|open| *open).await;

        let state = self.lock();
        if state.fail_reads {
            return Err(Error::Api("roster unavailable".to_string()));
        }
        Ok(state.roster.clone())
    }

    async fn fetch_settings(&self) -> Result<Option<RemoteSettings>> {
        let mut state = self.lock();
        state.settings_fetches += 1;
        if state.fail_reads {
            return Err(Error::Api("settings unavailable".to_string()));
        }
        Ok(state.settings.clone())
    }

    async fn dispatch_status(&self, id: &StudentId, status: StudentStatus) -> Delivery {
        self.lock().status_dispatches.push((id.clone(), status));
        self.write_outcome()
    }

    async fn dispatch_setting(&self, field: SettingField, value: &SettingValue) -> Delivery {
        self.lock().setting_dispatches.push((field, value.clone()));
        self.write_outcome()
    }

    async fn upload_asset(&self, _bytes: &[u8], target_folder: &str, filename: &str) -> Option<String> {
        if self.lock().fail_writes {
            return None;
        }
        self.lock()
            .uploads
            .push((target_folder.to_string(), filename.to_string()));
        Some(format!("memory://{target_folder}/{filename}"))
    }

    async fn reset_all(&self) -> Delivery {
        let outcome = self.write_outcome();
        if outcome.is_delivered() {
            let mut state = self.lock();
            state.resets += 1;
            for student in &mut state.roster {
                student.status = StudentStatus::InClass;
            }
        }
        outcome
    }

    async fn list_authorized_users(&self) -> Vec<AuthorizedUser> {
        let state = self.lock();
        if state.fail_reads {
            vec![AuthorizedUser::fallback()]
        } else {
            state.users.clone()
        }
    }
}
