//! HTTP client for the robot web service.
//!
//! One request per call, no inline retries: a failed call is reported to
//! the caller, which abandons the poll cycle and tries again on the next
//! scheduled one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::types::{DetailEnvelope, ErrorEnvelope, ListEntry, StorageBox, StorageBoxId};

/// Base URL of the public robot web service.
pub const DEFAULT_BASE_URL: &str = "https://robot-ws.your-server.de";

/// Per-request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the poller needs from the robot web service.
#[async_trait]
pub trait StorageBoxApi: Send + Sync {
    /// List the ids of all storage boxes on the account.
    async fn list_storageboxes(&self) -> ClientResult<Vec<StorageBoxId>>;

    /// Fetch the full detail record of one storage box.
    async fn storagebox(&self, id: StorageBoxId) -> ClientResult<StorageBox>;
}

#[async_trait]
impl<T: StorageBoxApi + ?Sized> StorageBoxApi for Arc<T> {
    async fn list_storageboxes(&self) -> ClientResult<Vec<StorageBoxId>> {
        (**self).list_storageboxes().await
    }

    async fn storagebox(&self, id: StorageBoxId) -> ClientResult<StorageBox> {
        (**self).storagebox(id).await
    }
}

/// HTTP Basic credentials for the robot web service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// reqwest-backed [`StorageBoxApi`] implementation.
#[derive(Clone)]
pub struct RobotClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl RobotClient {
    /// Create a client against `base_url` with the given request timeout.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("storagebox-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// GET `path` and decode a 200 body as `T`, or a non-200 body as the
    /// robot's error envelope.
    async fn get<T: DeserializeOwned>(&self, path: &str, context: &'static str) -> ClientResult<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "robot request");

        let transport = |source| ClientError::Transport {
            url: url.clone(),
            source,
        };

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        if status != StatusCode::OK {
            let envelope: ErrorEnvelope = serde_json::from_slice(&body)
                .map_err(|source| ClientError::Decode {
                    context: "error",
                    source,
                })?;
            warn!(
                %url,
                http_status = status.as_u16(),
                status = envelope.error.status,
                code = %envelope.error.code,
                "robot API error"
            );
            return Err(ClientError::Api {
                status: envelope.error.status,
                code: envelope.error.code,
            });
        }

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { context, source })
    }
}

#[async_trait]
impl StorageBoxApi for RobotClient {
    async fn list_storageboxes(&self) -> ClientResult<Vec<StorageBoxId>> {
        let entries: Vec<ListEntry> = self.get("/storagebox", "list").await?;
        Ok(entries.into_iter().map(|e| e.storagebox.id).collect())
    }

    async fn storagebox(&self, id: StorageBoxId) -> ClientResult<StorageBox> {
        let detail: DetailEnvelope = self.get(&format!("/storagebox/{id}"), "detail").await?;
        Ok(detail.storagebox)
    }
}
