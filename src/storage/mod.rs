//! Object storage collaborator
//!
//! The pipeline reads exactly one thing from storage: an object's
//! last-modified timestamp. [`HttpObjectStore`] speaks the GCS JSON metadata
//! API; [`MemoryObjectStore`] backs tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Deserialize;

/// Object metadata, produced entirely by the storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub last_modified: DateTime<Utc>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn metadata(&self, bucket: &str, object: &str) -> Result<ObjectMetadata, StoreError>;
}

/// Storage collaborator errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object {bucket}/{object} not found")]
    NotFound { bucket: String, object: String },

    #[error("storage request failed: {0}")]
    Network(String),

    #[error("invalid object metadata: {0}")]
    Metadata(String),
}

/// Client for a GCS-style JSON metadata API.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ObjectResource {
    updated: DateTime<Utc>,
}

impl HttpObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn object_url(&self, bucket: &str, object: &str) -> String {
        // Object names may contain slashes; the metadata API wants them escaped.
        let object = object.replace('/', "%2F");
        format!("{}/storage/v1/b/{}/o/{}", self.base_url, bucket, object)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn metadata(&self, bucket: &str, object: &str) -> Result<ObjectMetadata, StoreError> {
        let response = self
            .client
            .get(self.object_url(bucket, object))
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(StoreError::Network(format!(
                "storage returned {}",
                response.status()
            )));
        }

        let resource: ObjectResource = response
            .json()
            .await
            .map_err(|e| StoreError::Metadata(e.to_string()))?;

        Ok(ObjectMetadata {
            last_modified: resource.updated,
        })
    }
}

/// In-memory object table for tests. Counts metadata fetches so tests can
/// assert a failed validation never reached storage.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), DateTime<Utc>>>,
    fetches: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        bucket: impl Into<String>,
        object: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) {
        self.objects
            .write()
            .insert((bucket.into(), object.into()), last_modified);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn metadata(&self, bucket: &str, object: &str) -> Result<ObjectMetadata, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.objects
            .read()
            .get(&(bucket.to_string(), object.to_string()))
            .copied()
            .map(|last_modified| ObjectMetadata { last_modified })
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use chrono::TimeZone;

    #[test]
    fn test_object_url_escapes_slashes() {
        let store = HttpObjectStore::new("https://storage.example/");
        assert_eq!(
            store.object_url("backups", "nightly/db.sql.gz"),
            "https://storage.example/storage/v1/b/backups/o/nightly%2Fdb.sql.gz"
        );
    }

    #[tokio::test]
    async fn test_memory_store_counts_fetches() {
        let store = MemoryObjectStore::new();
        let when = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        store.insert("backups", "db.sql.gz", when);

        let metadata = store.metadata("backups", "db.sql.gz").await.unwrap();
        assert_eq!(metadata.last_modified, when);

        let err = store.metadata("backups", "missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.fetch_count(), 2);
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_http_store_reads_updated_field() {
        let app = Router::new().route(
            "/storage/v1/b/backups/o/db.sql.gz",
            get(|| async {
                axum::Json(serde_json::json!({
                    "name": "db.sql.gz",
                    "updated": "2026-01-01T06:30:00Z"
                }))
            }),
        );
        let base = serve(app).await;

        let store = HttpObjectStore::new(base);
        let metadata = store.metadata("backups", "db.sql.gz").await.unwrap();
        assert_eq!(
            metadata.last_modified,
            Utc.with_ymd_and_hms(2026, 1, 1, 6, 30, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_http_store_maps_404_to_not_found() {
        let app = Router::new();
        let base = serve(app).await;

        let store = HttpObjectStore::new(base);
        let err = store.metadata("backups", "missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
