use std::sync::Arc;

use sitesync_core::auth::AdminCredentials;
use sitesync_core::events::EventBus;
use sitesync_core::storage::{
    http::HttpStoreConfig, DiskRemoteStore, HttpRemoteStore, MemoryRemoteStore, RemoteStore,
};
use sitesync_core::sync::ContentSynchronizer;
use sitesync_core::error::StorageError;

use crate::config::{AppConfig, StorageBackend};

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    config: AppConfig,
    sync: Arc<ContentSynchronizer>,
    credentials: Arc<AdminCredentials>,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        sync: Arc<ContentSynchronizer>,
        credentials: AdminCredentials,
        http: reqwest::Client,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                config,
                sync,
                credentials: Arc::new(credentials),
                http,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn sync(&self) -> &ContentSynchronizer {
        &self.inner.sync
    }

    /// The configured object store, if any.
    pub fn store(&self) -> Option<&Arc<dyn RemoteStore>> {
        self.inner.sync.remote()
    }

    pub fn credentials(&self) -> &Arc<AdminCredentials> {
        &self.inner.credentials
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub fn event_bus(&self) -> &EventBus {
        self.inner.sync.events()
    }
}

/// Build the object store selected by configuration.
pub fn remote_store(config: &AppConfig) -> Result<Option<Arc<dyn RemoteStore>>, StorageError> {
    let store: Arc<dyn RemoteStore> = match &config.storage {
        StorageBackend::None => return Ok(None),
        StorageBackend::Disk { dir } => {
            Arc::new(DiskRemoteStore::new(dir.clone(), config.public_storage_base.clone()))
        }
        StorageBackend::Http { url, token } => Arc::new(HttpRemoteStore::new(HttpStoreConfig {
            base_url: url.clone(),
            token: token.clone(),
            user_agent: format!("sitesync/{}", env!("CARGO_PKG_VERSION")),
        })?),
        StorageBackend::Memory => Arc::new(MemoryRemoteStore::new(config.public_storage_base.clone())),
    };
    Ok(Some(store))
}
