//! Shared board state types.

use serde::Serialize;

use crate::clock::Timestamp;
use crate::models::{BoardSettings, Student};

/// Where the board's current data came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncSource {
    /// Last cycle reached the remote store
    #[default]
    Live,
    /// Last cycle failed; showing last-known-good data
    Fallback,
}

/// Read-only copy of the board for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub roster: Vec<Student>,
    pub settings: BoardSettings,
    pub source: SyncSource,
    pub last_sync: Option<Timestamp>,
    /// Dismissal window state at the time the snapshot was taken
    pub dismissal_open: bool,
}
