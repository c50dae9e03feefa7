use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events emitted by the content synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncEvent {
    Initialized(InitializedEvent),
    ContentChanged(ContentChangedEvent),
    Published(PublishedEvent),
    PublishFailed(PublishFailedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializedEvent {
    /// Which source ended up authoritative: `local`, `remote` or `defaults`.
    pub source: String,
    pub updated_at: i64,
    pub has_unsaved_changes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChangedEvent {
    pub mutation: String,
    pub updated_at: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEvent {
    pub version: String,
    pub updated_at: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishFailedEvent {
    pub updated_at: i64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
