use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use super::fetch::fetch_published;
use super::resolve::{resolve, Resolution, SyncPolicy};
use crate::cache::{CacheKey, LocalCache};
use crate::clock::{next_timestamp, Clock, SystemClock};
use crate::content::model::{CustomSection, HomeField, SiteContent};
use crate::content::version::{snapshot_path, PointerRecord, LEGACY_PATH, POINTER_PATH};
use crate::error::{PublishStep, SyncError};
use crate::events::bus::EventBus;
use crate::events::types::{
    ContentChangedEvent, InitializedEvent, PublishFailedEvent, PublishedEvent, SyncEvent,
};
use crate::mutation::types::ContentMutation;
use crate::storage::{CachePolicy, ObjectMeta, RemoteStore};

#[derive(Debug, Clone)]
struct SyncState {
    content: SiteContent,
    has_unsaved_changes: bool,
    initialized: bool,
}

/// Snapshot of the synchronizer's flags for status endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub initialized: bool,
    pub has_unsaved_changes: bool,
    pub storage_configured: bool,
    pub storage_backend: Option<String>,
    pub updated_at: i64,
}

/// Returned by a successful publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub version: String,
    pub updated_at: i64,
    pub snapshot_url: String,
}

/// Owns the site document for one editing session.
///
/// Constructed once at startup and shared by reference. The document starts
/// as the hardcoded defaults, is overlaid by [`initialize`](Self::initialize),
/// and changes only through [`apply`](Self::apply) and
/// [`publish`](Self::publish). Both wait until initialization has finished so
/// an edit can never be reconciled against, or published over, a snapshot
/// that has not been read yet. Every change is written through to the local
/// cache; cache failures are logged and the in-memory copy stays
/// authoritative.
pub struct ContentSynchronizer {
    state: RwLock<SyncState>,
    local: Arc<dyn LocalCache>,
    remote: Option<Arc<dyn RemoteStore>>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    policy: SyncPolicy,
    ready: watch::Sender<bool>,
}

impl ContentSynchronizer {
    pub fn new(
        local: Arc<dyn LocalCache>,
        remote: Option<Arc<dyn RemoteStore>>,
        events: EventBus,
    ) -> Self {
        Self {
            state: RwLock::new(SyncState {
                content: SiteContent::default(),
                has_unsaved_changes: false,
                initialized: false,
            }),
            local,
            remote,
            clock: Arc::new(SystemClock),
            events,
            policy: SyncPolicy::default(),
            ready: watch::channel(false).0,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn remote(&self) -> Option<&Arc<dyn RemoteStore>> {
        self.remote.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn content(&self) -> SiteContent {
        self.state.read().await.content.clone()
    }

    pub async fn has_unsaved_changes(&self) -> bool {
        self.state.read().await.has_unsaved_changes
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.initialized
    }

    pub async fn status(&self) -> SyncStatus {
        let state = self.state.read().await;
        SyncStatus {
            initialized: state.initialized,
            has_unsaved_changes: state.has_unsaved_changes,
            storage_configured: self.remote.is_some(),
            storage_backend: self.remote.as_ref().map(|r| r.name().to_string()),
            updated_at: state.content.updated_at,
        }
    }

    /// Load the local draft, fetch the published snapshot and decide which
    /// one is authoritative. Never fails: every source is optional.
    pub async fn initialize(&self) -> Resolution {
        let local_draft = self.load_local_draft().await;
        if let Some(draft) = &local_draft {
            // Readers see the draft while the published snapshot loads.
            self.state.write().await.content = draft.clone();
        }

        let remote = match &self.remote {
            Some(store) => {
                // Reads may be public; missing write access only matters at publish time.
                if let Err(e) = store.authenticate().await {
                    debug!(error = %e, backend = store.name(), "storage write access unavailable");
                }
                fetch_published(store.as_ref()).await.map(|s| s.content)
            }
            None => None,
        };
        let last_published = self.load_last_published().await;

        let mut state = self.state.write().await;
        let resolution = resolve(local_draft.as_ref(), remote, last_published, &self.policy);
        if let Resolution::AdoptRemote(content) = &resolution {
            state.content = content.clone();
            self.persist_draft(content).await;
            self.persist_last_published(content.updated_at).await;
        }
        state.has_unsaved_changes = resolution.has_unsaved_changes();
        state.initialized = true;
        let updated_at = state.content.updated_at;
        drop(state);
        self.ready.send_replace(true);

        info!(
            source = resolution.source(),
            updated_at,
            unsaved = resolution.has_unsaved_changes(),
            "content initialized"
        );
        self.events.publish(SyncEvent::Initialized(InitializedEvent {
            source: resolution.source().to_string(),
            updated_at,
            has_unsaved_changes: resolution.has_unsaved_changes(),
        }));
        resolution
    }

    /// Apply one edit. Mutations are serialized and each is computed from
    /// the immediately preceding document.
    pub async fn apply(&self, mutation: ContentMutation) -> Result<SiteContent, SyncError> {
        self.wait_until_initialized().await;
        let mut state = self.state.write().await;
        mutation.validate(&state.content)?;

        let updated_at = next_timestamp(state.content.updated_at, self.clock.now_millis());
        let next = mutation.apply(&state.content, updated_at);
        state.content = next.clone();
        self.persist_draft(&next).await;
        state.has_unsaved_changes = true;
        drop(state);

        debug!(mutation = mutation.kind(), updated_at, "content changed");
        self.events.publish(SyncEvent::ContentChanged(ContentChangedEvent {
            mutation: mutation.kind().to_string(),
            updated_at,
            timestamp: Utc::now(),
        }));
        Ok(next)
    }

    pub async fn update_home_field(
        &self,
        field: HomeField,
        value: impl Into<String>,
    ) -> Result<SiteContent, SyncError> {
        self.apply(ContentMutation::UpdateHomeField {
            field,
            value: value.into(),
        })
        .await
    }

    pub async fn add_custom_section(&self, section: CustomSection) -> Result<SiteContent, SyncError> {
        self.apply(ContentMutation::AddCustomSection { section }).await
    }

    pub async fn remove_custom_section(&self, id: impl Into<String>) -> Result<SiteContent, SyncError> {
        self.apply(ContentMutation::RemoveCustomSection { id: id.into() })
            .await
    }

    pub async fn update_image(
        &self,
        slot: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<SiteContent, SyncError> {
        self.apply(ContentMutation::UpdateImage {
            slot: slot.into(),
            url: url.into(),
        })
        .await
    }

    pub async fn add_gallery_image(&self, url: impl Into<String>) -> Result<SiteContent, SyncError> {
        self.apply(ContentMutation::AddGalleryImage { url: url.into() })
            .await
    }

    pub async fn remove_gallery_image(&self, url: impl Into<String>) -> Result<SiteContent, SyncError> {
        self.apply(ContentMutation::RemoveGalleryImage { url: url.into() })
            .await
    }

    /// Promote the current draft to a new published snapshot.
    ///
    /// The document is stamped, cached locally and recorded as last
    /// published before any network call, and is not rolled back if the
    /// remote writes fail. Remote writes go snapshot, pointer, legacy and
    /// stop at the first failure so the pointer never names a missing
    /// snapshot.
    pub async fn publish(&self) -> Result<PublishReceipt, SyncError> {
        self.wait_until_initialized().await;
        let snapshot = {
            let mut state = self.state.write().await;
            let updated_at = next_timestamp(state.content.updated_at, self.clock.now_millis());
            let snapshot = state.content.clone().with_updated_at(updated_at);
            self.persist_draft(&snapshot).await;
            self.persist_last_published(updated_at).await;
            state.content = snapshot.clone();
            state.has_unsaved_changes = false;
            snapshot
        };

        match self.push_snapshot(&snapshot).await {
            Ok(receipt) => {
                info!(version = %receipt.version, updated_at = receipt.updated_at, "content published");
                self.events.publish(SyncEvent::Published(PublishedEvent {
                    version: receipt.version.clone(),
                    updated_at: receipt.updated_at,
                    timestamp: Utc::now(),
                }));
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, updated_at = snapshot.updated_at, "publish failed");
                self.events.publish(SyncEvent::PublishFailed(PublishFailedEvent {
                    updated_at: snapshot.updated_at,
                    message: e.to_string(),
                    timestamp: Utc::now(),
                }));
                Err(e)
            }
        }
    }

    async fn wait_until_initialized(&self) {
        let mut ready = self.ready.subscribe();
        if !*ready.borrow() {
            debug!("waiting for content initialization");
        }
        // The sender lives in `self`, so this only returns once ready.
        let _ = ready.wait_for(|ready| *ready).await;
    }

    async fn push_snapshot(&self, snapshot: &SiteContent) -> Result<PublishReceipt, SyncError> {
        let store = self.remote.as_ref().ok_or(SyncError::StorageNotConfigured)?;
        let step_err = |step: PublishStep| move |source| SyncError::Publish { step, source };

        store
            .authenticate()
            .await
            .map_err(step_err(PublishStep::Authenticate))?;

        let body = snapshot.to_json()?.into_bytes();
        let pointer = PointerRecord::for_snapshot(snapshot.updated_at);
        let snapshot_key = snapshot_path(snapshot.updated_at);

        store
            .put(&snapshot_key, body.clone(), ObjectMeta::json(CachePolicy::Immutable))
            .await
            .map_err(step_err(PublishStep::Snapshot))?;
        store
            .put(
                POINTER_PATH,
                serde_json::to_vec(&pointer)?,
                ObjectMeta::json(CachePolicy::NoCache),
            )
            .await
            .map_err(step_err(PublishStep::Pointer))?;
        store
            .put(LEGACY_PATH, body, ObjectMeta::json(CachePolicy::NoCache))
            .await
            .map_err(step_err(PublishStep::Legacy))?;

        Ok(PublishReceipt {
            version: pointer.version,
            updated_at: snapshot.updated_at,
            snapshot_url: store.public_url(&snapshot_key),
        })
    }

    async fn load_local_draft(&self) -> Option<SiteContent> {
        let raw = match self.local.read(CacheKey::Draft).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "could not read cached draft");
                return None;
            }
        };
        match SiteContent::from_json(raw.as_bytes()) {
            Ok(draft) => Some(draft),
            Err(e) => {
                warn!(error = %e, "ignoring unparseable cached draft");
                None
            }
        }
    }

    async fn load_last_published(&self) -> i64 {
        match self.local.read(CacheKey::LastPublished).await {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                debug!(value = %raw, "ignoring malformed last-published timestamp");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "could not read last-published timestamp");
                0
            }
        }
    }

    async fn persist_draft(&self, content: &SiteContent) {
        let json = match content.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "could not serialize draft for local cache");
                return;
            }
        };
        if let Err(e) = self.local.write(CacheKey::Draft, &json).await {
            warn!(error = %e, bytes = json.len(), "local draft cache write failed; continuing in memory");
        }
    }

    async fn persist_last_published(&self, updated_at: i64) {
        if let Err(e) = self
            .local
            .write(CacheKey::LastPublished, &updated_at.to_string())
            .await
        {
            warn!(error = %e, "could not record last-published timestamp");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryLocalCache;
    use crate::clock::ManualClock;
    use crate::content::model::IMAGE_SLOTS;
    use crate::error::StorageError;
    use crate::storage::MemoryRemoteStore;

    struct Harness {
        cache: Arc<MemoryLocalCache>,
        store: Arc<MemoryRemoteStore>,
        clock: Arc<ManualClock>,
        events: EventBus,
    }

    impl Harness {
        fn new(now: i64) -> Self {
            Self {
                cache: Arc::new(MemoryLocalCache::new()),
                store: Arc::new(MemoryRemoteStore::new("/storage")),
                clock: Arc::new(ManualClock::new(now)),
                events: EventBus::new(64),
            }
        }

        fn synchronizer(&self) -> ContentSynchronizer {
            ContentSynchronizer::new(
                self.cache.clone(),
                Some(self.store.clone() as Arc<dyn RemoteStore>),
                self.events.clone(),
            )
            .with_clock(self.clock.clone())
        }

        fn offline_synchronizer(&self) -> ContentSynchronizer {
            ContentSynchronizer::new(self.cache.clone(), None, self.events.clone())
                .with_clock(self.clock.clone())
        }

        fn cache_draft(&self, content: &SiteContent) {
            self.cache.insert(CacheKey::Draft, content.to_json().unwrap());
        }

        fn cache_last_published(&self, ts: i64) {
            self.cache.insert(CacheKey::LastPublished, ts.to_string());
        }

        fn cached_draft(&self) -> Option<SiteContent> {
            self.cache
                .get(CacheKey::Draft)
                .map(|raw| SiteContent::from_json(raw.as_bytes()).unwrap())
        }

        fn cached_last_published(&self) -> Option<i64> {
            self.cache
                .get(CacheKey::LastPublished)
                .map(|raw| raw.parse().unwrap())
        }

        fn publish_remote(&self, content: &SiteContent) {
            let body = content.to_json().unwrap().into_bytes();
            let meta = ObjectMeta::json(CachePolicy::NoCache);
            self.store.insert(
                snapshot_path(content.updated_at),
                body.clone(),
                meta.clone(),
            );
            self.store.insert(
                POINTER_PATH,
                serde_json::to_vec(&PointerRecord::for_snapshot(content.updated_at)).unwrap(),
                meta.clone(),
            );
            self.store.insert(LEGACY_PATH, body, meta);
        }
    }

    fn titled(updated_at: i64, title: &str) -> SiteContent {
        let mut content = SiteContent::default().with_updated_at(updated_at);
        content.home.hero_title = title.to_string();
        content
    }

    #[tokio::test]
    async fn starts_from_defaults_uninitialized() {
        let h = Harness::new(10_000);
        let sync = h.synchronizer();
        assert!(!sync.is_initialized().await);
        assert_eq!(sync.content().await, SiteContent::default());
    }

    #[tokio::test]
    async fn newer_local_draft_is_kept_as_unsaved() {
        let h = Harness::new(10_000);
        h.cache_draft(&titled(5000, "local edit"));
        h.cache_last_published(1000);
        h.publish_remote(&titled(2000, "published"));

        let sync = h.synchronizer();
        let resolution = sync.initialize().await;

        assert_eq!(resolution, Resolution::KeepLocal);
        let content = sync.content().await;
        assert_eq!(content.home.hero_title, "local edit");
        assert_eq!(content.updated_at, 5000);
        assert!(sync.has_unsaved_changes().await);
        assert!(sync.is_initialized().await);
        assert_eq!(h.cached_draft().unwrap().updated_at, 5000);
        assert_eq!(h.cached_last_published(), Some(1000));
    }

    #[tokio::test]
    async fn publish_echo_within_buffer_adopts_remote() {
        let h = Harness::new(10_000);
        h.cache_draft(&titled(5000, "local edit"));
        h.cache_last_published(4999);
        h.publish_remote(&titled(2000, "published"));

        let sync = h.synchronizer();
        sync.initialize().await;

        let content = sync.content().await;
        assert_eq!(content.home.hero_title, "published");
        assert_eq!(content.updated_at, 2000);
        assert!(!sync.has_unsaved_changes().await);
        assert_eq!(h.cached_draft().unwrap().home.hero_title, "published");
        assert_eq!(h.cached_last_published(), Some(2000));
    }

    #[tokio::test]
    async fn adopted_remote_backfills_missing_slots() {
        let h = Harness::new(10_000);
        let raw = serde_json::json!({
            "images": { "logo": "https://cdn.example.com/logo.png" },
            "updatedAt": 3000
        });
        h.store.insert(
            LEGACY_PATH,
            raw.to_string().into_bytes(),
            ObjectMeta::json(CachePolicy::NoCache),
        );

        let sync = h.synchronizer();
        sync.initialize().await;

        let content = sync.content().await;
        assert_eq!(content.updated_at, 3000);
        assert_eq!(content.images["logo"], "https://cdn.example.com/logo.png");
        for slot in IMAGE_SLOTS {
            assert!(content.images.contains_key(*slot));
        }
        assert!(content.gallery.is_empty());
    }

    #[tokio::test]
    async fn unreachable_remote_keeps_local_draft_unconfirmed() {
        let h = Harness::new(10_000);
        h.cache_draft(&titled(100, "offline"));

        let sync = h.synchronizer();
        assert_eq!(sync.initialize().await, Resolution::LocalOnly);
        assert_eq!(sync.content().await.home.hero_title, "offline");
        assert!(sync.has_unsaved_changes().await);
        assert!(sync.is_initialized().await);
    }

    #[tokio::test]
    async fn no_sources_initializes_with_defaults() {
        let h = Harness::new(10_000);
        let sync = h.offline_synchronizer();
        assert_eq!(sync.initialize().await, Resolution::Defaults);
        assert_eq!(sync.content().await, SiteContent::default());
        assert!(!sync.has_unsaved_changes().await);
        assert!(sync.is_initialized().await);
        assert!(h.cached_draft().is_none());
    }

    #[tokio::test]
    async fn corrupt_local_draft_is_ignored() {
        let h = Harness::new(10_000);
        h.cache.insert(CacheKey::Draft, "{broken");
        h.cache.insert(CacheKey::LastPublished, "not-a-number");
        h.publish_remote(&titled(2000, "published"));

        let sync = h.synchronizer();
        assert!(matches!(sync.initialize().await, Resolution::AdoptRemote(_)));
        assert_eq!(sync.content().await.home.hero_title, "published");
    }

    #[tokio::test]
    async fn init_swallows_storage_auth_failures() {
        let h = Harness::new(10_000);
        h.publish_remote(&titled(2000, "published"));
        h.store.set_auth_failure(Some("token expired".to_string()));

        let sync = h.synchronizer();
        sync.initialize().await;
        assert_eq!(sync.content().await.home.hero_title, "published");
    }

    #[tokio::test]
    async fn mutations_are_monotonic_even_with_a_stalled_clock() {
        let h = Harness::new(7_000);
        let sync = h.synchronizer();
        sync.initialize().await;

        let mut previous = sync.content().await.updated_at;
        for i in 0..5 {
            let next = sync
                .update_home_field(HomeField::HeroTitle, format!("title {i}"))
                .await
                .unwrap();
            assert!(next.updated_at > previous);
            previous = next.updated_at;
        }
        assert_eq!(previous, 7_004);

        h.clock.set(100);
        let next = sync.add_gallery_image("https://cdn.example.com/a.jpg").await.unwrap();
        assert_eq!(next.updated_at, 7_005);
    }

    #[tokio::test]
    async fn mutations_write_through_and_mark_unsaved() {
        let h = Harness::new(20_000);
        let sync = h.synchronizer();
        sync.initialize().await;

        sync.update_image("hero", "https://cdn.example.com/hero.jpg").await.unwrap();
        sync.add_custom_section(CustomSection {
            id: "pricing-faq".to_string(),
            title: "Pricing FAQ".to_string(),
            content: "<p>Billed monthly</p>".to_string(),
            image: None,
            page: "pricing".to_string(),
        })
        .await
        .unwrap();

        assert!(sync.has_unsaved_changes().await);
        let cached = h.cached_draft().unwrap();
        assert_eq!(cached, sync.content().await);
        assert_eq!(cached.images["hero"], "https://cdn.example.com/hero.jpg");
        assert_eq!(cached.custom_sections.len(), 1);

        sync.remove_custom_section("pricing-faq").await.unwrap();
        sync.remove_gallery_image("missing").await.unwrap();
        assert!(sync.content().await.custom_sections.is_empty());
    }

    #[tokio::test]
    async fn cache_failure_does_not_interrupt_edits() {
        let h = Harness::new(20_000);
        let sync = h.synchronizer();
        sync.initialize().await;
        h.cache.set_fail_writes(true);

        let next = sync
            .update_home_field(HomeField::AboutTitle, "About us")
            .await
            .unwrap();

        assert_eq!(sync.content().await, next);
        assert!(sync.has_unsaved_changes().await);
        assert!(h.cached_draft().is_none());
    }

    #[tokio::test]
    async fn invalid_mutation_leaves_state_untouched() {
        let h = Harness::new(20_000);
        let sync = h.synchronizer();
        sync.initialize().await;
        let before = sync.content().await;

        let err = sync.update_image("  ", "x").await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(sync.content().await, before);
        assert!(!sync.has_unsaved_changes().await);
    }

    #[tokio::test]
    async fn publish_writes_snapshot_pointer_then_legacy() {
        let h = Harness::new(50_000);
        let sync = h.synchronizer();
        sync.initialize().await;
        sync.update_home_field(HomeField::HeroTitle, "Launch").await.unwrap();
        h.clock.set(60_000);

        let receipt = sync.publish().await.unwrap();

        assert_eq!(receipt.updated_at, 60_000);
        assert_eq!(receipt.version, "site_config_60000.json");
        assert_eq!(receipt.snapshot_url, "/storage/config/site_config_60000.json");
        assert_eq!(
            h.store.write_log(),
            vec![
                "config/site_config_60000.json",
                "config/current.json",
                "config/site_config.json"
            ]
        );

        let snapshot = h.store.object("config/site_config_60000.json").unwrap();
        assert!(snapshot.meta.cache_control.contains("immutable"));
        let pointer = h.store.object(POINTER_PATH).unwrap();
        assert!(pointer.meta.cache_control.starts_with("no-cache"));
        let pointer: PointerRecord = serde_json::from_slice(&pointer.bytes).unwrap();
        assert_eq!(pointer, PointerRecord::for_snapshot(60_000));
        let legacy = h.store.object(LEGACY_PATH).unwrap();
        assert_eq!(legacy.bytes, snapshot.bytes);

        assert!(!sync.has_unsaved_changes().await);
        assert_eq!(h.cached_last_published(), Some(60_000));
        assert_eq!(h.cached_draft().unwrap().updated_at, 60_000);
    }

    #[tokio::test]
    async fn published_content_is_adopted_after_reload() {
        let h = Harness::new(50_000);
        let sync = h.synchronizer();
        sync.initialize().await;
        sync.update_home_field(HomeField::HeroTitle, "Launch").await.unwrap();
        sync.publish().await.unwrap();

        let reloaded = h.synchronizer();
        assert!(matches!(reloaded.initialize().await, Resolution::AdoptRemote(_)));
        assert_eq!(reloaded.content().await.home.hero_title, "Launch");
        assert!(!reloaded.has_unsaved_changes().await);
    }

    #[tokio::test]
    async fn publish_without_storage_fails_after_local_stamp() {
        let h = Harness::new(30_000);
        let sync = h.offline_synchronizer();
        sync.initialize().await;
        sync.update_home_field(HomeField::HeroTitle, "Draft").await.unwrap();
        let before = sync.content().await;
        h.clock.set(40_000);

        let err = sync.publish().await.unwrap_err();

        assert!(matches!(err, SyncError::StorageNotConfigured));
        let after = sync.content().await;
        assert_eq!(after.home, before.home);
        assert_eq!(after.updated_at, 40_000);
        assert_eq!(h.cached_last_published(), Some(40_000));
        assert_eq!(h.cached_draft().unwrap().updated_at, 40_000);
        assert!(!sync.has_unsaved_changes().await);
    }

    #[tokio::test]
    async fn failed_pointer_write_stops_publish_without_rollback() {
        let h = Harness::new(30_000);
        let sync = h.synchronizer();
        sync.initialize().await;
        sync.update_home_field(HomeField::HeroTitle, "Partial").await.unwrap();
        h.store.fail_writes_to(POINTER_PATH);
        h.clock.set(31_000);

        let err = sync.publish().await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::Publish {
                step: PublishStep::Pointer,
                source: StorageError::Injected(_)
            }
        ));
        assert!(err.to_string().contains("pointer update"));
        assert_eq!(h.store.write_log(), vec!["config/site_config_31000.json"]);
        assert!(h.store.object(LEGACY_PATH).is_none());
        assert_eq!(sync.content().await.updated_at, 31_000);
        assert!(!sync.has_unsaved_changes().await);
    }

    #[tokio::test]
    async fn publish_surfaces_auth_failures() {
        let h = Harness::new(30_000);
        let sync = h.synchronizer();
        sync.initialize().await;
        h.store.set_auth_failure(Some("token expired".to_string()));

        let err = sync.publish().await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Publish {
                step: PublishStep::Authenticate,
                ..
            }
        ));
        assert!(err.to_string().contains("token expired"));
        assert!(h.store.write_log().is_empty());
    }

    #[tokio::test]
    async fn emits_events_for_each_transition() {
        let h = Harness::new(30_000);
        let mut rx = h.events.subscribe();
        let sync = h.synchronizer();

        sync.initialize().await;
        sync.add_gallery_image("data:image/jpeg;base64,AAAA").await.unwrap();
        sync.publish().await.unwrap();

        assert!(matches!(rx.recv().await.unwrap(), SyncEvent::Initialized(e) if e.source == "defaults"));
        assert!(matches!(rx.recv().await.unwrap(), SyncEvent::ContentChanged(e) if e.mutation == "addGalleryImage"));
        assert!(matches!(rx.recv().await.unwrap(), SyncEvent::Published(_)));
    }

    #[tokio::test]
    async fn publish_waits_for_initialization() {
        let h = Harness::new(10_000);
        h.publish_remote(&titled(2000, "real published site"));
        let sync = Arc::new(h.synchronizer());

        let pending = tokio::spawn({
            let sync = sync.clone();
            async move { sync.publish().await }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());
        assert_eq!(h.store.write_log(), Vec::<String>::new());

        sync.initialize().await;
        let receipt = pending.await.unwrap().unwrap();

        assert_eq!(receipt.updated_at, 10_000);
        let legacy = h.store.object(LEGACY_PATH).unwrap();
        let legacy = SiteContent::from_json(&legacy.bytes).unwrap();
        assert_eq!(legacy.home.hero_title, "real published site");
    }

    #[tokio::test]
    async fn mutation_before_initialization_lands_on_published_content() {
        let h = Harness::new(10_000);
        h.publish_remote(&titled(2000, "real published site"));
        let sync = Arc::new(h.synchronizer());

        let pending = tokio::spawn({
            let sync = sync.clone();
            async move { sync.update_image("logo", "/logo.png").await }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        assert!(matches!(sync.initialize().await, Resolution::AdoptRemote(_)));
        let edited = pending.await.unwrap().unwrap();

        assert_eq!(edited.home.hero_title, "real published site");
        assert_eq!(edited.images["logo"], "/logo.png");
        assert_eq!(edited.updated_at, 10_000);
        assert!(sync.has_unsaved_changes().await);
    }

    #[tokio::test]
    async fn status_reports_storage_and_flags() {
        let h = Harness::new(30_000);
        let sync = h.synchronizer();
        let status = sync.status().await;
        assert!(!status.initialized);
        assert!(status.storage_configured);
        assert_eq!(status.storage_backend.as_deref(), Some("memory"));

        let offline = h.offline_synchronizer().status().await;
        assert!(!offline.storage_configured);
        assert_eq!(offline.storage_backend, None);
    }
}
