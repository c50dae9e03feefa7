/// Addressing for published content in the object store.
///
/// Layout under `config/`:
/// - Pointer: `config/current.json`, names the active snapshot
/// - Legacy: `config/site_config.json`, full copy of the latest snapshot
/// - Snapshot: `config/site_config_{updatedAt}.json`, immutable
use serde::{Deserialize, Serialize};

pub const CONFIG_PREFIX: &str = "config/";
pub const POINTER_PATH: &str = "config/current.json";
pub const LEGACY_PATH: &str = "config/site_config.json";

const SNAPSHOT_STEM: &str = "site_config_";
const JSON_EXT: &str = ".json";

/// File name of the snapshot published at `updated_at`.
pub fn snapshot_name(updated_at: i64) -> String {
    format!("{SNAPSHOT_STEM}{updated_at}{JSON_EXT}")
}

/// Full object store path of the snapshot published at `updated_at`.
pub fn snapshot_path(updated_at: i64) -> String {
    format!("{CONFIG_PREFIX}{}", snapshot_name(updated_at))
}

/// The small record at [`POINTER_PATH`] naming the active snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerRecord {
    pub version: String,
    #[serde(default)]
    pub updated_at: i64,
}

impl PointerRecord {
    pub fn for_snapshot(updated_at: i64) -> Self {
        Self {
            version: snapshot_name(updated_at),
            updated_at,
        }
    }

    /// Object path of the referenced snapshot, or `None` when the version
    /// is empty or tries to escape the config prefix.
    pub fn snapshot_path(&self) -> Option<String> {
        let version = self.version.trim();
        if version.is_empty() || version.contains('/') || version.contains("..") {
            return None;
        }
        Some(format!("{CONFIG_PREFIX}{version}"))
    }
}
