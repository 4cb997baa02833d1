//! Polling sync loop.
//!
//! A [`SyncContext`] owns the board state of one client session and keeps it
//! in step with the remote store. Each cycle fetches roster and settings,
//! merges them through the pending-update overlay and the settings
//! reconciler, then arms a one-shot timer for the next cycle, whether the
//! fetch succeeded or not. At most one cycle is in flight; a trigger that
//! arrives while one is running is dropped.

mod commands;

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

pub use commands::PendingDelivery;

use crate::clock::{Clock, SystemClock, Timestamp};
use crate::config::SyncTimings;
use crate::error::Result;
use crate::models::{BoardSettings, RemoteSettings, SettingField, Student, StudentId};
use crate::overlay::{PendingOverlay, PendingOverride};
use crate::reconcile::{reconcile_settings, FieldTimestamps};
use crate::state::{BoardSnapshot, SyncSource};
use crate::store::RemoteStore;

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was already in flight
    Skipped,
    Finished(CycleReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// The local roster was replaced by the fetched one
    pub roster_replaced: bool,
    /// Settings fields that took the fetched value
    pub adopted: Vec<SettingField>,
    pub source: SyncSource,
}

#[derive(Debug, Default)]
struct Board {
    roster: Vec<Student>,
    settings: BoardSettings,
    overlay: PendingOverlay,
    stamps: FieldTimestamps,
    source: SyncSource,
    last_sync: Option<Timestamp>,
}

struct Shared<S, C> {
    store: Arc<S>,
    clock: C,
    timings: SyncTimings,
    board: Mutex<Board>,
    in_flight: AtomicBool,
    running: AtomicBool,
    timer: StdMutex<Option<ArmedTimer>>,
    cycles: watch::Sender<u64>,
}

/// One-shot reschedule timer. `fired` flips under the timer lock once the
/// sleep is over, after which the task is running a cycle and must not be
/// aborted.
struct ArmedTimer {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

impl ArmedTimer {
    fn is_waiting(&self) -> bool {
        !self.fired.load(Ordering::Acquire) && !self.handle.is_finished()
    }

    fn cancel(self) {
        if !self.fired.load(Ordering::Acquire) {
            self.handle.abort();
        }
    }
}

/// Session-scoped sync state and loop for one board client.
pub struct SyncContext<S, C = SystemClock> {
    shared: Arc<Shared<S, C>>,
}

impl<S, C> Clone for SyncContext<S, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: RemoteStore> SyncContext<S> {
    pub fn new(store: S, timings: SyncTimings) -> Self {
        Self::with_clock(store, SystemClock, timings)
    }
}

impl<S: RemoteStore, C: Clock> SyncContext<S, C> {
    pub fn with_clock(store: S, clock: C, timings: SyncTimings) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: Arc::new(store),
                clock,
                timings,
                board: Mutex::new(Board::default()),
                in_flight: AtomicBool::new(false),
                running: AtomicBool::new(false),
                timer: StdMutex::new(None),
                cycles: watch::Sender::new(0),
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.shared.store
    }

    pub fn timings(&self) -> &SyncTimings {
        &self.shared.timings
    }

    /// Start polling: run the first cycle now and keep rescheduling until
    /// [`SyncContext::stop`].
    pub async fn start(&self) -> CycleOutcome {
        self.shared.running.store(true, Ordering::Release);
        tracing::info!(
            interval_ms = self.shared.timings.poll_interval_ms,
            "Starting sync loop"
        );
        self.shared.run_cycle().await
    }

    /// Tear the loop down by cancelling a timer that has not fired yet. A
    /// cycle already in flight, timer-driven or not, finishes but does not
    /// reschedule.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(timer) = self.shared.lock_timer().take() {
            timer.cancel();
        }
        tracing::info!("Sync loop stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Whether a cycle is currently awaiting the remote store.
    pub fn is_syncing(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    /// Whether a timer is still sleeping towards the next cycle. A timer
    /// that already fired and is running its cycle does not count.
    pub fn has_armed_timer(&self) -> bool {
        self.shared
            .lock_timer()
            .as_ref()
            .is_some_and(ArmedTimer::is_waiting)
    }

    /// Run a cycle immediately, subject to the in-flight guard.
    pub async fn sync_now(&self) -> CycleOutcome {
        self.shared.run_cycle().await
    }

    /// Receiver that observes the number of finished cycles.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.cycles.subscribe()
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        let now = self.shared.clock.now();
        let board = self.shared.board.lock().await;
        BoardSnapshot {
            roster: board.roster.clone(),
            settings: board.settings.clone(),
            source: board.source,
            last_sync: board.last_sync,
            dismissal_open: board.settings.schedule.is_open_at(&now),
        }
    }

    /// Whether calling students is currently permitted.
    pub async fn dismissal_open(&self) -> bool {
        let now = self.shared.clock.now();
        self.shared
            .board
            .lock()
            .await
            .settings
            .schedule
            .is_open_at(&now)
    }

    /// Stored override for `id`, expired or not.
    pub async fn pending_override(&self, id: &StudentId) -> Option<PendingOverride> {
        self.shared.board.lock().await.overlay.get(id).copied()
    }

    pub async fn last_local_edit(&self, field: SettingField) -> Option<Timestamp> {
        self.shared.board.lock().await.stamps.last(field)
    }
}

/// Clears the in-flight flag on every exit path, including cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: RemoteStore, C: Clock> Shared<S, C> {
    async fn run_cycle(self: &Arc<Self>) -> CycleOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("Sync cycle already in flight, skipping");
            return CycleOutcome::Skipped;
        }
        let guard = InFlightGuard(&self.in_flight);

        let (roster, settings) = tokio::join!(self.store.fetch_roster(), self.store.fetch_settings());
        let report = self.apply(roster, settings).await;
        tracing::debug!(
            roster_replaced = report.roster_replaced,
            source = ?report.source,
            "Sync cycle finished"
        );

        // Released before arming so a zero-interval timer never sees this
        // cycle as still in flight.
        drop(guard);
        self.arm_next_cycle();
        self.cycles.send_modify(|count| *count += 1);
        CycleOutcome::Finished(report)
    }

    async fn apply(
        &self,
        roster: Result<Vec<Student>>,
        settings: Result<Option<RemoteSettings>>,
    ) -> CycleReport {
        let now = self.clock.now();
        let mut guard = self.board.lock().await;
        let board = &mut *guard;
        let mut report = CycleReport::default();
        let mut failed = false;
        let mut live = false;

        match roster {
            Ok(fresh) if fresh.is_empty() => {
                tracing::debug!("Remote roster is empty, keeping last-known-good roster");
            }
            Ok(fresh) => {
                board.roster = board.overlay.apply(fresh, now);
                report.roster_replaced = true;
            }
            Err(error) => {
                tracing::warn!("Roster fetch failed: {}", error);
                failed = true;
            }
        }

        match settings {
            Ok(Some(fetched)) => {
                report.adopted = reconcile_settings(
                    &mut board.settings,
                    &fetched,
                    &board.stamps,
                    now,
                    self.timings.settings_cooldown(),
                );
                live = true;
            }
            Ok(None) => tracing::debug!("Remote store returned no settings"),
            Err(error) => {
                tracing::warn!("Settings fetch failed: {}", error);
                failed = true;
            }
        }

        if failed {
            board.source = SyncSource::Fallback;
        } else {
            if live {
                board.source = SyncSource::Live;
            }
            board.last_sync = Some(now);
        }
        report.source = board.source;
        report
    }

    /// Replace any armed timer with a fresh one-shot for the next cycle.
    fn arm_next_cycle(self: &Arc<Self>) {
        let mut slot = self.lock_timer();
        // A fired previous timer is the task running this cycle, or a cycle
        // that was skipped; either way it ends on its own.
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        if !self.running.load(Ordering::Acquire) {
            return;
        }

        let fired = Arc::new(AtomicBool::new(false));
        let task_fired = Arc::clone(&fired);
        let shared = Arc::clone(self);
        let interval = self.timings.poll_interval();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if shared.fire(&task_fired) {
                shared.scheduled_cycle().await;
            }
        });
        *slot = Some(ArmedTimer { handle, fired });
    }

    /// Mark a timer as fired unless the loop was stopped first. Taking the
    /// timer lock orders this against `stop`.
    fn fire(&self, fired: &AtomicBool) -> bool {
        let _slot = self.lock_timer();
        if !self.running.load(Ordering::Acquire) {
            return false;
        }
        fired.store(true, Ordering::Release);
        true
    }

    // Boxed so the timer task's future does not contain itself.
    fn scheduled_cycle(self: Arc<Self>) -> Pin<Box<dyn Future<Output = CycleOutcome> + Send>> {
        Box::pin(async move { self.run_cycle().await })
    }

    fn lock_timer(&self) -> MutexGuard<'_, Option<ArmedTimer>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
