//! edudismiss-core - Core library for EduDismiss
//!
//! This crate contains the shared models, the remote store adapter and the
//! polling sync engine used by every EduDismiss client. The sync engine keeps
//! a local board in step with the remote roster and settings while letting
//! local edits win for a short window.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod overlay;
pub mod reconcile;
pub mod roster;
pub mod state;
pub mod store;
pub mod sync;
pub mod util;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use config::{ClientConfig, SyncTimings};
pub use error::{CommandError, Error, Result};
pub use models::{Student, StudentId, StudentStatus};
pub use state::{BoardSnapshot, SyncSource};
pub use store::{AppsScriptStore, Delivery, MemoryStore, RemoteStore};
pub use sync::{CycleOutcome, CycleReport, PendingDelivery, SyncContext};
