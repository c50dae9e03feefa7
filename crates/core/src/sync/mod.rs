/// Content synchronization
///
/// Reconciles the locally cached draft against the published snapshot and
/// publishes drafts as new versioned snapshots.
pub mod fetch;
pub mod resolve;
pub mod synchronizer;

pub use fetch::{fetch_published, FetchedSnapshot, SnapshotSource};
pub use resolve::{resolve, Resolution, SyncPolicy, PUBLISH_ECHO_BUFFER_MS};
pub use synchronizer::{ContentSynchronizer, PublishReceipt, SyncStatus};
