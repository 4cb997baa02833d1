//! HTTP client for the spreadsheet-backed roster script.
//!
//! Reads are `GET {endpoint}?action=...&cb=...` with a cache-busting
//! timestamp. Writes are `POST {endpoint}` with a `text/plain` JSON body,
//! which the script host accepts without a CORS preflight.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};

use super::normalize::{encode_setting, normalize_settings, normalize_students, normalize_users};
use super::{Delivery, RemoteStore};
use crate::clock::{Clock, SystemClock};
use crate::config::SyncTimings;
use crate::error::{Error, Result};
use crate::models::{
    AuthorizedUser, RemoteSettings, SettingField, SettingValue, Student, StudentId, StudentStatus,
};
use crate::util::{compact_text, normalize_endpoint, unix_timestamp_millis};

const TEXT_PLAIN: &str = "text/plain;charset=utf-8";

/// Remote store backed by the roster script's web endpoint.
#[derive(Debug)]
pub struct AppsScriptStore {
    endpoint: RwLock<Option<String>>,
    client: reqwest::Client,
    timings: SyncTimings,
}

impl AppsScriptStore {
    /// Build a store for `endpoint`. `None` leaves the store unconfigured:
    /// reads fail with [`Error::NotConfigured`] and writes are not delivered.
    pub fn new(endpoint: Option<&str>, timings: SyncTimings) -> Result<Self> {
        let endpoint = endpoint.map(normalize_endpoint).transpose()?;
        Ok(Self {
            endpoint: RwLock::new(endpoint),
            client: reqwest::Client::builder().build()?,
            timings,
        })
    }

    pub fn endpoint(&self) -> Option<String> {
        self.endpoint
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point the store at a different script deployment.
    pub fn set_endpoint(&self, endpoint: &str) -> Result<()> {
        let endpoint = normalize_endpoint(endpoint)?;
        tracing::info!("Remote store endpoint set to {}", endpoint);
        *self.endpoint.write().unwrap_or_else(PoisonError::into_inner) = Some(endpoint);
        Ok(())
    }

    fn require_endpoint(&self) -> Result<String> {
        self.endpoint().ok_or(Error::NotConfigured)
    }

    async fn get_action(&self, action: &str, timeout: Duration) -> Result<Value> {
        let endpoint = self.require_endpoint()?;
        let cache_buster = unix_timestamp_millis().to_string();

        let response = self
            .client
            .get(&endpoint)
            .query(&[("action", action), ("cb", cache_buster.as_str())])
            .header(ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|error| map_transport_error(error, timeout))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "{action} returned HTTP {status}: {}",
                compact_text(&body)
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|error| map_transport_error(error, timeout))?;
        serde_json::from_str(&body).map_err(|error| {
            Error::InvalidPayload(format!("{action} returned invalid JSON: {error}"))
        })
    }

    async fn post_action(&self, body: &Value) -> Result<reqwest::Response> {
        let endpoint = self.require_endpoint()?;
        let response = self
            .client
            .post(&endpoint)
            .header(CONTENT_TYPE, TEXT_PLAIN)
            .body(body.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "HTTP {status}: {}",
                compact_text(&text)
            )));
        }
        Ok(response)
    }

    async fn deliver(&self, body: Value) -> Delivery {
        Delivery::from(self.post_action(&body).await.map(|_| ()))
    }
}

impl RemoteStore for AppsScriptStore {
    async fn fetch_roster(&self) -> Result<Vec<Student>> {
        let payload = self
            .get_action("getStudents", self.timings.read_timeout())
            .await?;
        normalize_students(&payload, SystemClock.now())
    }

    async fn fetch_settings(&self) -> Result<Option<RemoteSettings>> {
        let payload = self
            .get_action("getSettings", self.timings.read_timeout())
            .await?;
        Ok(normalize_settings(&payload))
    }

    async fn dispatch_status(&self, id: &StudentId, status: StudentStatus) -> Delivery {
        self.deliver(json!({
            "action": "updateStatus",
            "studentId": id.as_str(),
            "status": status.as_str(),
        }))
        .await
    }

    async fn dispatch_setting(&self, field: SettingField, value: &SettingValue) -> Delivery {
        self.deliver(json!({
            "action": "updateSetting",
            "setting": field.wire_name(),
            "value": encode_setting(value),
        }))
        .await
    }

    async fn upload_asset(&self, bytes: &[u8], target_folder: &str, filename: &str) -> Option<String> {
        let body = json!({
            "action": "uploadLogo",
            "base64": BASE64.encode(bytes),
            "folderId": target_folder,
            "filename": filename,
        });

        let response = match self.post_action(&body).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!("Asset upload failed: {}", error);
                return None;
            }
        };
        let text = match response.text().await {
            Ok(text) => text,
            Err(error) => {
                tracing::error!("Failed to read asset upload response: {}", error);
                return None;
            }
        };
        match serde_json::from_str::<UploadResponse>(&text) {
            Ok(payload) => payload.url.filter(|url| !url.trim().is_empty()),
            Err(_) => {
                tracing::error!(
                    "Failed to parse asset upload response: {}",
                    compact_text(&text)
                );
                None
            }
        }
    }

    async fn reset_all(&self) -> Delivery {
        self.deliver(json!({ "action": "resetAll" })).await
    }

    async fn list_authorized_users(&self) -> Vec<AuthorizedUser> {
        let users = self
            .get_action("getAdmins", self.timings.user_list_timeout())
            .await
            .and_then(|payload| normalize_users(&payload));
        match users {
            Ok(users) => users,
            Err(error) => {
                tracing::warn!("User list fetch failed, using fallback: {}", error);
                vec![AuthorizedUser::fallback()]
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

fn map_transport_error(error: reqwest::Error, timeout: Duration) -> Error {
    if error.is_timeout() {
        Error::Timeout(timeout)
    } else {
        Error::Http(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_endpoint() {
        let store =
            AppsScriptStore::new(Some(" https://script.example.com/exec/ "), SyncTimings::default())
                .unwrap();
        assert_eq!(
            store.endpoint().as_deref(),
            Some("https://script.example.com/exec")
        );
    }

    #[test]
    fn new_rejects_invalid_endpoint() {
        assert!(AppsScriptStore::new(Some("script.example.com"), SyncTimings::default()).is_err());
    }

    #[tokio::test]
    async fn unconfigured_store_fails_reads_and_writes() {
        let store = AppsScriptStore::new(None, SyncTimings::default()).unwrap();

        assert!(matches!(
            store.fetch_roster().await,
            Err(Error::NotConfigured)
        ));
        assert!(matches!(
            store.fetch_settings().await,
            Err(Error::NotConfigured)
        ));
        assert!(!store
            .dispatch_status(&StudentId::from("7"), StudentStatus::Called)
            .await
            .is_delivered());
        assert!(store.upload_asset(b"png", "folder", "logo.png").await.is_none());
    }

    #[tokio::test]
    async fn unconfigured_store_returns_fallback_users() {
        let store = AppsScriptStore::new(None, SyncTimings::default()).unwrap();
        let users = store.list_authorized_users().await;
        assert_eq!(users, vec![AuthorizedUser::fallback()]);
    }

    #[test]
    fn set_endpoint_replaces_value() {
        let store = AppsScriptStore::new(None, SyncTimings::default()).unwrap();
        store.set_endpoint("https://script.example.com/v2").unwrap();
        assert_eq!(
            store.endpoint().as_deref(),
            Some("https://script.example.com/v2")
        );
        assert!(store.set_endpoint("nope").is_err());
    }
}
