/// Remote object storage
///
/// Published snapshots, uploaded media, analytics logs and newsletter
/// signups all live in one object store addressed by slash-separated paths.
/// Backends:
/// - [`DiskRemoteStore`]: a local directory, served by the API itself
/// - [`HttpRemoteStore`]: any bucket or proxy that speaks GET/PUT
/// - [`MemoryRemoteStore`]: ephemeral, for tests and throwaway instances
pub mod disk;
pub mod http;
pub mod memory;

pub use disk::DiskRemoteStore;
pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// How long readers may cache an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Content at this path never changes once written.
    Immutable,
    /// Must be re-fetched on every read.
    NoCache,
    /// Uploaded media: long-lived but not marked immutable.
    Media,
}

impl CachePolicy {
    pub fn header_value(&self) -> &'static str {
        match self {
            CachePolicy::Immutable => "public, max-age=31536000, immutable",
            CachePolicy::NoCache => "no-cache, no-store, must-revalidate",
            CachePolicy::Media => "public, max-age=31536000",
        }
    }
}

/// Metadata stored alongside every object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub content_type: String,
    pub cache_control: String,
}

impl ObjectMeta {
    pub fn new(content_type: impl Into<String>, policy: CachePolicy) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: policy.header_value().to_string(),
        }
    }

    pub fn json(policy: CachePolicy) -> Self {
        Self::new(JSON_CONTENT_TYPE, policy)
    }
}

impl Default for ObjectMeta {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_TYPE, CachePolicy::NoCache)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub meta: ObjectMeta,
}

/// Object storage backend trait.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Backend name for logs and status output.
    fn name(&self) -> &'static str;

    /// Read an object; `Ok(None)` when it does not exist.
    async fn get(&self, path: &str) -> Result<Option<StoredObject>, StorageError>;

    /// Read an object bypassing any intermediate caches.
    async fn get_uncached(&self, path: &str) -> Result<Option<StoredObject>, StorageError> {
        self.get(path).await
    }

    /// Create or overwrite an object.
    async fn put(&self, path: &str, bytes: Vec<u8>, meta: ObjectMeta) -> Result<(), StorageError>;

    /// Paths of every object under `prefix` (which ends in `/`), sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Check that writes will be accepted.
    async fn authenticate(&self) -> Result<(), StorageError>;

    /// URL a browser can use to fetch the object.
    fn public_url(&self, path: &str) -> String;
}

/// Reject paths that are empty, absolute, or contain empty, hidden or
/// parent-directory segments.
pub fn validate_object_path(path: &str) -> Result<(), StorageError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment.starts_with('.'));
    if invalid {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Content type implied by an object's file extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "json" => JSON_CONTENT_TYPE,
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// A listing prefix is a valid object path followed by a trailing `/`.
pub fn validate_prefix(prefix: &str) -> Result<(), StorageError> {
    match prefix.strip_suffix('/') {
        Some(dir) => validate_object_path(dir),
        None => Err(StorageError::InvalidPath(prefix.to_string())),
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
