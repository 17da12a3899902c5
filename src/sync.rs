//! Remote backup of the whole snapshot.
//!
//! Push uploads the current state; pull downloads the remote document and
//! replaces the local state wholesale. There is no merge: the last write wins.

use std::fmt;
use std::time::Duration;

use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::models::Snapshot;
use crate::session::Session;

/// A document store that holds one snapshot.
pub trait RemoteStore {
    fn push(&self, snapshot: &Snapshot) -> Result<(), SyncError>;
    fn pull(&self) -> Result<Snapshot, SyncError>;
}

/// Outcome of a sync operation, ready to show to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Pushed { tasks: usize },
    Pulled { tasks: usize },
    Failed(String),
}

impl SyncStatus {
    pub fn is_ok(&self) -> bool {
        !matches!(self, SyncStatus::Failed(_))
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Pushed { tasks } => write!(f, "Backup uploaded ({} tasks).", tasks),
            SyncStatus::Pulled { tasks } => write!(f, "Backup restored ({} tasks).", tasks),
            SyncStatus::Failed(msg) => write!(f, "Sync failed: {}", msg),
        }
    }
}

/// Uploads the session state.
pub fn push(session: &Session, remote: &dyn RemoteStore) -> SyncStatus {
    let snapshot = session.snapshot();
    match remote.push(&snapshot) {
        Ok(()) => {
            info!("pushed {} tasks", snapshot.tasks.len());
            SyncStatus::Pushed {
                tasks: snapshot.tasks.len(),
            }
        }
        Err(e) => {
            warn!("push failed: {}", e);
            SyncStatus::Failed(e.to_string())
        }
    }
}

/// Replaces the session state with the remote document.
///
/// The session is untouched unless the remote document parsed cleanly.
pub fn pull(session: &mut Session, remote: &dyn RemoteStore) -> SyncStatus {
    match remote.pull() {
        Ok(snapshot) => {
            let tasks = snapshot.tasks.len();
            session.replace(snapshot);
            SyncStatus::Pulled { tasks }
        }
        Err(e) => {
            warn!("pull failed: {}", e);
            SyncStatus::Failed(e.to_string())
        }
    }
}

/// Extracts a snapshot from a remote response body.
///
/// Accepts either the snapshot itself or a `{"record": snapshot}` envelope.
pub fn decode_document(body: &str) -> Result<Snapshot, SyncError> {
    let mut value: serde_json::Value = serde_json::from_str(body)?;
    if let Some(record) = value.get_mut("record") {
        value = record.take();
    }
    if !value.is_object() {
        return Err(SyncError::Malformed(serde::de::Error::custom(
            "remote document is not a JSON object",
        )));
    }
    Ok(serde_json::from_value(value)?)
}

/// JSON document store reached over HTTP, keyed by token and document id.
pub struct HttpRemote {
    client: Client,
    url: String,
    token: String,
}

impl HttpRemote {
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(SyncError::NotConfigured("sync.token"))?;
        let document_id = config
            .document_id
            .clone()
            .filter(|d| !d.trim().is_empty())
            .ok_or(SyncError::NotConfigured("sync.document_id"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/{}", config.endpoint.trim_end_matches('/'), document_id.trim()),
            token,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(v) = HeaderValue::from_str(&self.token) {
            headers.insert("x-master-key", v);
        }
        headers
    }
}

impl RemoteStore for HttpRemote {
    fn push(&self, snapshot: &Snapshot) -> Result<(), SyncError> {
        let body = serde_json::to_string(snapshot)?;
        let res = self.client.put(&self.url).headers(self.headers()).body(body).send()?;
        if !res.status().is_success() {
            return Err(SyncError::Status(res.status().as_u16()));
        }
        Ok(())
    }

    fn pull(&self) -> Result<Snapshot, SyncError> {
        let res = self
            .client
            .get(format!("{}/latest", self.url))
            .headers(self.headers())
            .send()?;
        if !res.status().is_success() {
            return Err(SyncError::Status(res.status().as_u16()));
        }
        let body = res.text()?;
        decode_document(&body)
    }
}
