use thiserror::Error;
use tracing::debug;

use crate::content::model::SiteContent;
use crate::content::version::{PointerRecord, LEGACY_PATH, POINTER_PATH};
use crate::error::StorageError;
use crate::storage::RemoteStore;

#[derive(Debug, Error)]
enum FetchError {
    #[error("{0} does not exist")]
    Missing(String),
    #[error("pointer names an invalid version: {0:?}")]
    InvalidPointer(String),
    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Where a published snapshot was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Resolved through the pointer record; carries the version name.
    Pointer(String),
    Legacy,
}

#[derive(Debug, Clone)]
pub struct FetchedSnapshot {
    pub content: SiteContent,
    pub source: SnapshotSource,
}

/// Read the currently published document.
///
/// Tries pointer then snapshot, and on any failure falls back to the legacy
/// mirror. Returns `None` when neither can be read; failures are logged,
/// never returned.
pub async fn fetch_published(store: &dyn RemoteStore) -> Option<FetchedSnapshot> {
    match fetch_via_pointer(store).await {
        Ok(snapshot) => return Some(snapshot),
        Err(e) => debug!(error = %e, "pointer lookup failed, trying legacy snapshot"),
    }

    match fetch_legacy(store).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            debug!(error = %e, "legacy snapshot unavailable");
            None
        }
    }
}

async fn fetch_via_pointer(store: &dyn RemoteStore) -> Result<FetchedSnapshot, FetchError> {
    let object = store
        .get_uncached(POINTER_PATH)
        .await?
        .ok_or_else(|| FetchError::Missing(POINTER_PATH.to_string()))?;
    let pointer: PointerRecord =
        serde_json::from_slice(&object.bytes).map_err(|source| FetchError::Parse {
            path: POINTER_PATH.to_string(),
            source,
        })?;
    let path = pointer
        .snapshot_path()
        .ok_or_else(|| FetchError::InvalidPointer(pointer.version.clone()))?;

    // Snapshots are immutable, so a cached copy is as good as a fresh one.
    let object = store
        .get(&path)
        .await?
        .ok_or_else(|| FetchError::Missing(path.clone()))?;
    let content =
        SiteContent::from_json(&object.bytes).map_err(|source| FetchError::Parse { path, source })?;

    Ok(FetchedSnapshot {
        content,
        source: SnapshotSource::Pointer(pointer.version),
    })
}

async fn fetch_legacy(store: &dyn RemoteStore) -> Result<FetchedSnapshot, FetchError> {
    let object = store
        .get_uncached(LEGACY_PATH)
        .await?
        .ok_or_else(|| FetchError::Missing(LEGACY_PATH.to_string()))?;
    let content = SiteContent::from_json(&object.bytes).map_err(|source| FetchError::Parse {
        path: LEGACY_PATH.to_string(),
        source,
    })?;
    Ok(FetchedSnapshot {
        content,
        source: SnapshotSource::Legacy,
    })
}
