/// Local draft cache
///
/// Holds the unpublished draft, the last-published timestamp and the admin
/// credential hash. Reads and writes are best-effort from the synchronizer's
/// point of view: failures are logged and the in-memory document stays
/// authoritative.
pub mod file;
pub mod memory;

pub use file::FileLocalCache;
pub use memory::MemoryLocalCache;

use async_trait::async_trait;

use crate::error::CacheError;

/// Default byte budget shared by all keys.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Draft,
    LastPublished,
    AdminPasswordHash,
}

impl CacheKey {
    pub const ALL: [CacheKey; 3] = [
        CacheKey::Draft,
        CacheKey::LastPublished,
        CacheKey::AdminPasswordHash,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            CacheKey::Draft => "site_content_draft.json",
            CacheKey::LastPublished => "last_published_at",
            CacheKey::AdminPasswordHash => "admin_password.phc",
        }
    }
}

/// Key-value store for locally cached state.
#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn read(&self, key: CacheKey) -> Result<Option<String>, CacheError>;

    async fn write(&self, key: CacheKey, value: &str) -> Result<(), CacheError>;
}

/// Reject a write whose resulting total would exceed `limit`.
pub(crate) fn check_quota(limit: Option<usize>, other_bytes: usize, value: &str) -> Result<(), CacheError> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let needed = other_bytes + value.len();
    if needed > limit {
        return Err(CacheError::QuotaExceeded { needed, limit });
    }
    Ok(())
}
