/// HTTP object store backend
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{
    join_url, validate_object_path, validate_prefix, ObjectMeta, RemoteStore, StoredObject,
    DEFAULT_CONTENT_TYPE,
};
use crate::error::StorageError;

/// Configuration for an HTTP object store.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL objects are addressed under, e.g. `https://bucket.example.com/site`.
    pub base_url: String,
    /// Bearer token for writes. Reads are public.
    pub token: Option<String>,
    pub user_agent: String,
}

/// Object store spoken to over plain HTTP: `GET {base}/{path}` to read,
/// `PUT {base}/{path}` with a bearer token to write, and an authenticated
/// `GET {base}?prefix=<prefix>` answering `{"paths": [...]}` to list.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(config: HttpStoreConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| StorageError::Http {
                url: config.base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn fetch(&self, path: &str, bust_cache: bool) -> Result<Option<StoredObject>, StorageError> {
        validate_object_path(path)?;
        let url = self.url_for(path);
        let mut request = self.client.get(&url);
        if bust_cache {
            request = request
                .query(&[("t", Utc::now().timestamp_millis())])
                .header(header::CACHE_CONTROL, "no-cache");
        }

        let response = request.send().await.map_err(|e| StorageError::Http {
            url: url.clone(),
            source: e,
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%url, "object not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StorageError::Status {
                method: "GET",
                url,
                status: status.as_u16(),
            });
        }

        let meta = ObjectMeta {
            content_type: header_str(response.headers(), header::CONTENT_TYPE)
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string(),
            cache_control: header_str(response.headers(), header::CACHE_CONTROL)
                .unwrap_or_default()
                .to_string(),
        };
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Http { url, source: e })?;

        Ok(Some(StoredObject {
            bytes: bytes.to_vec(),
            meta,
        }))
    }

    fn write_token(&self) -> Result<&str, StorageError> {
        self.token
            .as_deref()
            .ok_or_else(|| StorageError::Unauthorized("no storage write token configured".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    paths: Vec<String>,
}

fn header_str(headers: &header::HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get(&self, path: &str) -> Result<Option<StoredObject>, StorageError> {
        self.fetch(path, false).await
    }

    async fn get_uncached(&self, path: &str) -> Result<Option<StoredObject>, StorageError> {
        self.fetch(path, true).await
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, meta: ObjectMeta) -> Result<(), StorageError> {
        validate_object_path(path)?;
        let token = self.write_token()?;
        let url = self.url_for(path);

        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, meta.content_type)
            .header(header::CACHE_CONTROL, meta.cache_control)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Http {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Unauthorized(format!("PUT {url}: {status} {body}")));
        }
        if !status.is_success() {
            return Err(StorageError::Status {
                method: "PUT",
                url,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        validate_prefix(prefix)?;
        let token = self.write_token()?;
        let url = self.base_url.clone();

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("prefix", prefix)])
            .send()
            .await
            .map_err(|e| StorageError::Http {
                url: url.clone(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                method: "GET",
                url,
                status: status.as_u16(),
            });
        }
        let listing: Listing = response
            .json()
            .await
            .map_err(|e| StorageError::Http { url, source: e })?;

        let mut paths: Vec<String> = listing
            .paths
            .into_iter()
            .filter(|p| p.starts_with(prefix) && validate_object_path(p).is_ok())
            .collect();
        paths.sort();
        Ok(paths)
    }

    async fn authenticate(&self) -> Result<(), StorageError> {
        self.write_token().map(|_| ())
    }

    fn public_url(&self, path: &str) -> String {
        self.url_for(path)
    }
}
