/// Disk-based object store
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{
    join_url, validate_object_path, validate_prefix, ObjectMeta, RemoteStore, StoredObject,
};
use crate::error::{storage_io, StorageError};

const META_DIR: &str = ".meta";

/// Stores objects as files under `root`, with metadata sidecars under
/// `root/.meta/<path>.json`. Object paths can never name the sidecar tree
/// because hidden segments are rejected.
#[derive(Debug, Clone)]
pub struct DiskRemoteStore {
    root: PathBuf,
    public_base: String,
}

impl DiskRemoteStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    fn object_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn meta_path(&self, path: &str) -> PathBuf {
        self.root.join(META_DIR).join(format!("{path}.json"))
    }

    async fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_io(parent, e))?;
        }
        let mut tmp = target.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, bytes).await.map_err(|e| storage_io(&tmp, e))?;
        fs::rename(&tmp, target)
            .await
            .map_err(|e| storage_io(target, e))
    }
}

#[async_trait]
impl RemoteStore for DiskRemoteStore {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn get(&self, path: &str) -> Result<Option<StoredObject>, StorageError> {
        validate_object_path(path)?;
        let file = self.object_path(path);
        let bytes = match fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_io(file, e)),
        };

        let meta_file = self.meta_path(path);
        let meta = match fs::read(&meta_file).await {
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ObjectMeta::default(),
            Err(e) => return Err(storage_io(meta_file, e)),
        };

        Ok(Some(StoredObject { bytes, meta }))
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, meta: ObjectMeta) -> Result<(), StorageError> {
        validate_object_path(path)?;
        let meta_json = serde_json::to_vec(&meta)?;
        Self::write_atomic(&self.object_path(path), &bytes).await?;
        Self::write_atomic(&self.meta_path(path), &meta_json).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        validate_prefix(prefix)?;
        let mut paths = Vec::new();
        let mut pending = vec![prefix.trim_end_matches('/').to_string()];

        while let Some(dir) = pending.pop() {
            let full = self.object_path(&dir);
            let mut entries = match fs::read_dir(&full).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(storage_io(full, e)),
            };
            while let Some(entry) = entries.next_entry().await.map_err(|e| storage_io(&full, e))? {
                let name = entry.file_name().to_string_lossy().into_owned();
                // In-flight writes and hidden files are not objects.
                if name.starts_with('.') || name.ends_with(".tmp") {
                    continue;
                }
                let child = format!("{dir}/{name}");
                let kind = entry.file_type().await.map_err(|e| storage_io(entry.path(), e))?;
                if kind.is_dir() {
                    pending.push(child);
                } else {
                    paths.push(child);
                }
            }
        }

        paths.sort();
        Ok(paths)
    }

    async fn authenticate(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| storage_io(&self.root, e))?;
        let meta = fs::metadata(&self.root)
            .await
            .map_err(|e| storage_io(&self.root, e))?;
        if meta.permissions().readonly() {
            return Err(StorageError::Unauthorized(format!(
                "{} is read-only",
                self.root.display()
            )));
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        join_url(&self.public_base, path)
    }
}
