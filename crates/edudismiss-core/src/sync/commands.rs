//! Local commands: status changes and settings edits.
//!
//! Every command applies to local state first and then pushes the change to
//! the remote store on a background task. Delivery failures are logged and
//! otherwise ignored; the next poll reconciles.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::{CycleOutcome, SyncContext};
use crate::clock::Clock;
use crate::error::{self, CommandError};
use crate::models::{
    BrandingUpdate, ScheduleConfig, SettingField, SettingValue, StudentId, StudentStatus,
};
use crate::store::{AppsScriptStore, Delivery, RemoteStore};

/// Handle to a background dispatch. Dropping it leaves the dispatch running.
#[derive(Debug)]
pub struct PendingDelivery(JoinHandle<Delivery>);

impl PendingDelivery {
    /// Wait for the dispatch to finish.
    pub async fn wait(self) -> Delivery {
        self.0
            .await
            .unwrap_or_else(|error| Delivery::Failed(format!("dispatch task failed: {error}")))
    }
}

impl<S: RemoteStore, C: Clock> SyncContext<S, C> {
    /// Change a student's status optimistically.
    ///
    /// Calling a student while the dismissal window is closed is refused
    /// without touching any state. Otherwise the change is registered in the
    /// overlay, applied to the local roster with a fresh timestamp and
    /// dispatched in the background.
    pub async fn request_status_change(
        &self,
        id: &StudentId,
        status: StudentStatus,
    ) -> Result<PendingDelivery, CommandError> {
        let now = self.shared.clock.now();
        {
            let mut guard = self.shared.board.lock().await;
            let board = &mut *guard;
            if status == StudentStatus::Called && !board.settings.schedule.is_open_at(&now) {
                tracing::info!(student = %id, "Refused call while dismissal is paused");
                return Err(CommandError::DismissalPaused);
            }

            board
                .overlay
                .register(id, status, self.shared.timings.overlay_ttl(), now);
            let stamp = now.to_rfc3339();
            for student in board.roster.iter_mut().filter(|student| &student.id == id) {
                student.status = status;
                student.time.clone_from(&stamp);
            }
        }

        let store = Arc::clone(&self.shared.store);
        let id = id.clone();
        Ok(PendingDelivery(tokio::spawn(async move {
            let delivery = store.dispatch_status(&id, status).await;
            if let Delivery::Failed(reason) = &delivery {
                tracing::warn!(student = %id, %status, "Status dispatch failed: {}", reason);
            }
            delivery
        })))
    }

    pub async fn set_exam_mode(&self, enabled: bool) -> PendingDelivery {
        {
            let mut board = self.shared.board.lock().await;
            board.settings.exam_mode = enabled;
        }
        self.edited(vec![(SettingField::ExamMode, SettingValue::Flag(enabled))])
            .await
    }

    /// Replace the whole schedule after validating it.
    pub async fn update_schedule(
        &self,
        schedule: ScheduleConfig,
    ) -> Result<PendingDelivery, CommandError> {
        schedule.validate().map_err(CommandError::InvalidSchedule)?;
        {
            let mut board = self.shared.board.lock().await;
            board.settings.schedule = schedule.clone();
        }
        Ok(self
            .edited(vec![(SettingField::Schedule, SettingValue::Schedule(schedule))])
            .await)
    }

    /// Apply the present branding fields; each is stamped and pushed on its own.
    pub async fn update_branding(&self, update: BrandingUpdate) -> PendingDelivery {
        let fields = update.fields();
        {
            let mut guard = self.shared.board.lock().await;
            let settings = &mut guard.settings;
            for (field, value) in &fields {
                let slot = match field {
                    SettingField::SchoolName => &mut settings.school_name,
                    SettingField::LogoUrl => &mut settings.logo_url,
                    _ => &mut settings.drive_folder_id,
                };
                slot.clone_from(value);
            }
        }
        self.edited(
            fields
                .into_iter()
                .map(|(field, value)| (field, SettingValue::Text(value)))
                .collect(),
        )
        .await
    }

    /// Upload a logo into the configured folder and brand the board with it.
    ///
    /// Returns the uploaded URL, or `None` when the upload failed.
    pub async fn upload_logo(&self, bytes: &[u8], filename: &str) -> Option<String> {
        let folder = self.shared.board.lock().await.settings.drive_folder_id.clone();
        let url = self.shared.store.upload_asset(bytes, &folder, filename).await?;
        let delivery = self
            .update_branding(BrandingUpdate {
                logo_url: Some(url.clone()),
                ..BrandingUpdate::default()
            })
            .await;
        drop(delivery);
        Some(url)
    }

    /// Reset every student remotely, then resync immediately.
    pub async fn reset_all(&self) -> (Delivery, CycleOutcome) {
        let delivery = self.shared.store.reset_all().await;
        if let Delivery::Failed(reason) = &delivery {
            tracing::warn!("Reset dispatch failed: {}", reason);
        }
        let outcome = self.sync_now().await;
        (delivery, outcome)
    }

    /// Stamp the edited fields and push them in order on one background task.
    async fn edited(&self, edits: Vec<(SettingField, SettingValue)>) -> PendingDelivery {
        let now = self.shared.clock.now();
        {
            let mut board = self.shared.board.lock().await;
            for (field, _) in &edits {
                board.stamps.stamp(*field, now);
            }
        }

        let store = Arc::clone(&self.shared.store);
        PendingDelivery(tokio::spawn(async move {
            let mut outcome = Delivery::Delivered;
            for (field, value) in edits {
                let delivery = store.dispatch_setting(field, &value).await;
                if let Delivery::Failed(reason) = &delivery {
                    tracing::warn!(%field, "Setting dispatch failed: {}", reason);
                }
                outcome = outcome.and(delivery);
            }
            outcome
        }))
    }
}

impl<C: Clock> SyncContext<AppsScriptStore, C> {
    /// Point the HTTP store at another deployment and resync right away.
    pub async fn set_endpoint(&self, endpoint: &str) -> error::Result<CycleOutcome> {
        self.shared.store.set_endpoint(endpoint)?;
        Ok(self.sync_now().await)
    }
}
