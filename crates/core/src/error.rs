use std::path::PathBuf;

use thiserror::Error;

use crate::content::validate::ValidationError;

/// Failures talking to the remote object store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object path is not allowed: {0}")]
    InvalidPath(String),

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned status {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    #[error("storage write credentials rejected: {0}")]
    Unauthorized(String),

    #[error("malformed object metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("injected failure writing {0}")]
    Injected(String),
}

/// Failures reading or writing the local draft cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("local cache quota exceeded: {needed} bytes requested, limit {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("local cache i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("local cache is unavailable")]
    Unavailable,
}

/// The remote write that failed during a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    Authenticate,
    Snapshot,
    Pointer,
    Legacy,
}

impl std::fmt::Display for PublishStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PublishStep::Authenticate => "authenticate",
            PublishStep::Snapshot => "snapshot upload",
            PublishStep::Pointer => "pointer update",
            PublishStep::Legacy => "legacy mirror update",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the content synchronizer.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote storage is not configured; publishing is disabled")]
    StorageNotConfigured,

    #[error("publish failed during {step}: {source}")]
    Publish {
        step: PublishStep,
        #[source]
        source: StorageError,
    },

    #[error("failed to serialize content: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors from admin credential handling.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("current password is incorrect")]
    InvalidPassword,

    #[error("new password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Map an I/O error into a cache error at `path`.
pub fn cache_io(path: impl Into<PathBuf>, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.into(),
        source,
    }
}

/// Map an I/O error into a storage error at `path`.
pub fn storage_io(path: impl Into<PathBuf>, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.into(),
        source,
    }
}
