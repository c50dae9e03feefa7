/// Directory-backed local cache
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::{check_quota, CacheKey, LocalCache};
use crate::error::{cache_io, CacheError};

/// Stores each key as one file under `dir`.
///
/// Writes go to `<file>.tmp` and are renamed into place so a crash never
/// leaves a half-written draft behind.
#[derive(Debug, Clone)]
pub struct FileLocalCache {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileLocalCache {
    pub fn new(dir: impl Into<PathBuf>, quota: Option<usize>) -> Self {
        Self {
            dir: dir.into(),
            quota,
        }
    }

    fn path_for(&self, key: CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    async fn bytes_used_by_others(&self, key: CacheKey) -> usize {
        let mut total = 0;
        for other in CacheKey::ALL.iter().filter(|k| **k != key) {
            if let Ok(meta) = fs::metadata(self.path_for(*other)).await {
                total += meta.len() as usize;
            }
        }
        total
    }
}

#[async_trait]
impl LocalCache for FileLocalCache {
    async fn read(&self, key: CacheKey) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(cache_io(path, e)),
        }
    }

    async fn write(&self, key: CacheKey, value: &str) -> Result<(), CacheError> {
        if self.quota.is_some() {
            let others = self.bytes_used_by_others(key).await;
            check_quota(self.quota, others, value)?;
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| cache_io(&self.dir, e))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).await.map_err(|e| cache_io(&tmp, e))?;
        fs::rename(&tmp, &path).await.map_err(|e| cache_io(&path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLocalCache::new(dir.path(), None);
        assert_eq!(cache.read(CacheKey::Draft).await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_then_read_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLocalCache::new(dir.path().join("nested"), None);
        cache.write(CacheKey::LastPublished, "1234").await.unwrap();
        assert_eq!(
            cache.read(CacheKey::LastPublished).await.unwrap().as_deref(),
            Some("1234")
        );
        assert!(!dir.path().join("nested").join("last_published_at.tmp").exists());
    }

    #[tokio::test]
    async fn quota_counts_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLocalCache::new(dir.path(), Some(10));
        cache.write(CacheKey::LastPublished, "123456").await.unwrap();

        let err = cache.write(CacheKey::Draft, "abcde").await.unwrap_err();
        assert!(matches!(err, CacheError::QuotaExceeded { needed: 11, limit: 10 }));

        // Overwriting the same key does not count its old value.
        cache.write(CacheKey::LastPublished, "1234567890").await.unwrap();
    }
}
