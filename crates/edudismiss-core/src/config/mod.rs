//! Client configuration.
//!
//! Provides the sync cadence/timeouts and the remote store endpoint
//! resolution shared by every front end.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::util::{normalize_endpoint, normalize_text_option};

/// Environment variable that overrides the remote store endpoint.
pub const ENDPOINT_ENV_VAR: &str = "EDUDISMISS_ENDPOINT_URL";

/// Deployed roster script used when nothing else is configured.
pub const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbw6b29fHkXcCxFVH1BJbmLFXoyZWMHc60awEFKbdU8orr3Z4KyfFMyl8hd9JiL0Kn4kRg/exec";

/// Sync cadence, read timeouts and reconciliation windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTimings {
    /// Delay between the end of one sync cycle and the start of the next
    pub poll_interval_ms: u64,
    /// Timeout for roster and settings reads
    pub read_timeout_ms: u64,
    /// Timeout for the authorized user list
    pub user_list_timeout_ms: u64,
    /// How long an optimistic status change masks remote reads
    pub overlay_ttl_ms: u64,
    /// How long a local settings edit wins over remote reads
    pub settings_cooldown_ms: u64,
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3_000,
            read_timeout_ms: 12_000,
            user_list_timeout_ms: 8_000,
            overlay_ttl_ms: 10_000,
            settings_cooldown_ms: 5_000,
        }
    }
}

impl SyncTimings {
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub const fn user_list_timeout(&self) -> Duration {
        Duration::from_millis(self.user_list_timeout_ms)
    }

    pub const fn overlay_ttl(&self) -> Duration {
        Duration::from_millis(self.overlay_ttl_ms)
    }

    pub const fn settings_cooldown(&self) -> Duration {
        Duration::from_millis(self.settings_cooldown_ms)
    }
}

/// Runtime configuration for a board client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub timings: SyncTimings,
}

impl ClientConfig {
    /// Resolve the endpoint from an explicit value, the environment, a
    /// persisted value, then the built-in default.
    pub fn resolve(explicit: Option<String>, persisted: Option<String>) -> Result<Self> {
        let endpoint_url = resolve_endpoint(
            explicit,
            std::env::var(ENDPOINT_ENV_VAR).ok(),
            persisted,
        )?;
        Ok(Self {
            endpoint_url: Some(endpoint_url),
            timings: SyncTimings::default(),
        })
    }
}

/// Pick the first non-empty endpoint candidate and validate it.
pub fn resolve_endpoint(
    explicit: Option<String>,
    env: Option<String>,
    persisted: Option<String>,
) -> Result<String> {
    let candidate = normalize_text_option(explicit)
        .or_else(|| normalize_text_option(env))
        .or_else(|| normalize_text_option(persisted))
        .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string());
    normalize_endpoint(&candidate)
}
