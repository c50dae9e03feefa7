use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    join_url, validate_object_path, validate_prefix, ObjectMeta, RemoteStore, StoredObject,
};
use crate::error::StorageError;

/// In-process object store.
///
/// Records the order of writes and can be told to fail writes to specific
/// paths or to reject credentials, which is how partial publishes are
/// exercised in tests.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    write_log: Mutex<Vec<String>>,
    failing_paths: Mutex<HashSet<String>>,
    auth_failure: Mutex<Option<String>>,
    public_base: String,
}

impl MemoryRemoteStore {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into(),
            ..Self::default()
        }
    }

    /// Seed an object without recording a write.
    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>, meta: ObjectMeta) {
        lock(&self.objects).insert(
            path.into(),
            StoredObject {
                bytes: bytes.into(),
                meta,
            },
        );
    }

    pub fn object(&self, path: &str) -> Option<StoredObject> {
        lock(&self.objects).get(path).cloned()
    }

    pub fn paths_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut paths: Vec<_> = lock(&self.objects)
            .keys()
            .filter(|p| p.starts_with(prefix))
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    /// Paths successfully written, in order.
    pub fn write_log(&self) -> Vec<String> {
        lock(&self.write_log).clone()
    }

    pub fn fail_writes_to(&self, path: impl Into<String>) {
        lock(&self.failing_paths).insert(path.into());
    }

    pub fn set_auth_failure(&self, message: Option<String>) {
        *lock(&self.auth_failure) = message;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, path: &str) -> Result<Option<StoredObject>, StorageError> {
        validate_object_path(path)?;
        Ok(self.object(path))
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, meta: ObjectMeta) -> Result<(), StorageError> {
        validate_object_path(path)?;
        if let Some(message) = lock(&self.auth_failure).clone() {
            return Err(StorageError::Unauthorized(message));
        }
        if lock(&self.failing_paths).contains(path) {
            return Err(StorageError::Injected(path.to_string()));
        }
        lock(&self.objects).insert(path.to_string(), StoredObject { bytes, meta });
        lock(&self.write_log).push(path.to_string());
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        validate_prefix(prefix)?;
        Ok(self.paths_with_prefix(prefix))
    }

    async fn authenticate(&self) -> Result<(), StorageError> {
        match lock(&self.auth_failure).clone() {
            Some(message) => Err(StorageError::Unauthorized(message)),
            None => Ok(()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        join_url(&self.public_base, path)
    }
}
