use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{check_quota, CacheKey, LocalCache};
use crate::error::CacheError;

/// In-process cache. Used for ephemeral deployments and in tests.
#[derive(Debug, Default)]
pub struct MemoryLocalCache {
    entries: Mutex<HashMap<CacheKey, String>>,
    quota: Option<usize>,
    fail_writes: AtomicBool,
}

impl MemoryLocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Seed a value without going through quota checks.
    pub fn insert(&self, key: CacheKey, value: impl Into<String>) {
        self.lock().insert(key, value.into());
    }

    pub fn get(&self, key: CacheKey) -> Option<String> {
        self.lock().get(&key).cloned()
    }

    /// Make every subsequent write fail, as a full or disabled store would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LocalCache for MemoryLocalCache {
    async fn read(&self, key: CacheKey) -> Result<Option<String>, CacheError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: CacheKey, value: &str) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable);
        }
        let mut entries = self.lock();
        let others: usize = entries
            .iter()
            .filter(|(k, _)| **k != key)
            .map(|(_, v)| v.len())
            .sum();
        check_quota(self.quota, others, value)?;
        entries.insert(key, value.to_string());
        Ok(())
    }
}
