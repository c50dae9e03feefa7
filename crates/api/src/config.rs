use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where published content and uploads are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Not configured: publishing and remote uploads are disabled.
    None,
    Disk { dir: PathBuf },
    Http { url: String, token: Option<String> },
    Memory,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("unknown STORAGE_BACKEND {0:?} (expected disk, http or memory)")]
    UnknownBackend(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Directory holding the local draft cache.
    pub local_cache_dir: PathBuf,
    /// Byte budget for the local draft cache.
    pub local_cache_quota_bytes: usize,
    pub storage: StorageBackend,
    /// URL prefix the disk and memory backends are served under.
    pub public_storage_base: String,
    /// Publish-echo buffer used when reconciling drafts.
    pub sync_buffer_ms: u64,
    pub admin_password: Option<String>,
    /// Shared secret for the voice-agent prompt endpoint.
    pub retell_secret: Option<String>,
    pub analytics_api_url: Option<String>,
    pub analytics_api_token: Option<String>,
    pub gallery_max_width: u32,
    pub gallery_quality: u8,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage = match get("STORAGE_BACKEND").map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("none") => StorageBackend::None,
            Some("disk") => StorageBackend::Disk {
                dir: get("STORAGE_DIR")
                    .map(PathBuf::from)
                    .ok_or(ConfigError::Missing("STORAGE_DIR"))?,
            },
            Some("http") => StorageBackend::Http {
                url: get("STORAGE_URL").ok_or(ConfigError::Missing("STORAGE_URL"))?,
                token: get("STORAGE_TOKEN"),
            },
            Some("memory") => StorageBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(get("PORT"), "PORT", 3030)?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            event_bus_capacity: parse_or(get("EVENT_BUS_CAPACITY"), "EVENT_BUS_CAPACITY", 1024)?,
            local_cache_dir: get("LOCAL_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".sitesync")),
            local_cache_quota_bytes: parse_or(
                get("LOCAL_CACHE_QUOTA_BYTES"),
                "LOCAL_CACHE_QUOTA_BYTES",
                sitesync_core::cache::DEFAULT_QUOTA_BYTES,
            )?,
            storage,
            public_storage_base: get("PUBLIC_STORAGE_BASE").unwrap_or_else(|| "/storage".to_string()),
            sync_buffer_ms: parse_or(
                get("SYNC_BUFFER_MS"),
                "SYNC_BUFFER_MS",
                sitesync_core::sync::PUBLISH_ECHO_BUFFER_MS,
            )?,
            admin_password: get("ADMIN_PASSWORD"),
            retell_secret: get("RETELL_SECRET"),
            analytics_api_url: get("ANALYTICS_API_URL"),
            analytics_api_token: get("ANALYTICS_API_TOKEN"),
            gallery_max_width: parse_or(
                get("GALLERY_MAX_WIDTH"),
                "GALLERY_MAX_WIDTH",
                sitesync_media::compress::DEFAULT_MAX_WIDTH,
            )?,
            gallery_quality: parse_or(
                get("GALLERY_QUALITY"),
                "GALLERY_QUALITY",
                sitesync_media::compress::DEFAULT_QUALITY,
            )?,
            max_upload_bytes: parse_or(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn storage_configured(&self) -> bool {
        self.storage != StorageBackend::None
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests(storage: StorageBackend) -> Self {
        let mut config = Self::from_lookup(|_| None).expect("defaults are valid");
        config.storage = storage;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3030");
        assert_eq!(config.storage, StorageBackend::None);
        assert!(!config.storage_configured());
        assert_eq!(config.sync_buffer_ms, 1000);
        assert_eq!(config.gallery_max_width, 1200);
        assert_eq!(config.gallery_quality, 70);
        assert_eq!(config.public_storage_base, "/storage");
        assert_eq!(config.retell_secret, None);
    }

    #[test]
    fn storage_backends() {
        let config = load(&[("STORAGE_BACKEND", "disk"), ("STORAGE_DIR", "/srv/site")]).unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Disk {
                dir: PathBuf::from("/srv/site")
            }
        );

        let config = load(&[
            ("STORAGE_BACKEND", "HTTP"),
            ("STORAGE_URL", "https://bucket.example.com"),
            ("STORAGE_TOKEN", ""),
        ])
        .unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Http {
                url: "https://bucket.example.com".to_string(),
                token: None
            }
        );
        assert!(config.storage_configured());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        ));
        assert!(matches!(
            load(&[("STORAGE_BACKEND", "disk")]),
            Err(ConfigError::Missing("STORAGE_DIR"))
        ));
        assert!(matches!(
            load(&[("STORAGE_BACKEND", "ftp")]),
            Err(ConfigError::UnknownBackend(_))
        ));
        assert!(matches!(
            load(&[("GALLERY_QUALITY", "300")]),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
