//! Blob storage seam: `put(key, bytes) -> url`.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::RwLock;

use crate::error::StoreError;

/// Content types the store accepts for uploads.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "model/gltf-binary",
    "application/octet-stream",
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
];

pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(content_type.trim()))
}

/// Result of a successful put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
}

/// Public blob storage. Keys are paths like `thumbnails/<id>-<millis>.png`.
pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<StoredObject, StoreError>> + Send;

    /// Remove the object behind a URL previously returned by `put`.
    fn delete(&self, url: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug, Clone)]
struct StoredBlob {
    content_type: String,
    bytes: Vec<u8>,
}

/// In-memory store for development and tests. URLs are `<base_url>/<key>`.
#[derive(Debug)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<HashMap<String, StoredBlob>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    /// Bytes and content type stored at `url`.
    pub fn get(&self, url: &str) -> Option<(String, Vec<u8>)> {
        self.objects
            .read()
            .get(strip_query(url))
            .map(|b| (b.content_type.clone(), b.bytes.clone()))
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

/// Cache-busting query strings (`?v=...`) do not change the object.
fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StoreError> {
        if !is_allowed_content_type(content_type) {
            return Err(StoreError::ContentTypeNotAllowed(content_type.to_string()));
        }
        let url = self.url_for(key);
        tracing::debug!("storing {} bytes at {url}", bytes.len());
        self.objects.write().insert(
            url.clone(),
            StoredBlob {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(StoredObject { url })
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        match self.objects.write().remove(strip_query(url)) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(url.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist() {
        assert!(is_allowed_content_type("model/gltf-binary"));
        assert!(is_allowed_content_type("IMAGE/PNG"));
        assert!(!is_allowed_content_type("text/html"));
        assert!(!is_allowed_content_type("image/svg+xml"));
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("memory://blobs/a.png?v=12"), "memory://blobs/a.png");
        assert_eq!(strip_query("memory://blobs/a.png"), "memory://blobs/a.png");
    }

    #[test]
    fn test_url_for_joins_cleanly() {
        let store = MemoryObjectStore::new("https://cdn.example/");
        assert_eq!(store.url_for("/thumbnails/x.png"), "https://cdn.example/thumbnails/x.png");
    }
}
