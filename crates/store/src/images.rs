use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::gateway::{StoreError, StoreResult};

/// Product image storage seam (admin only).
///
/// Upload yields a public URL; delete takes that URL back. No
/// content-addressing or deduplication, matching the backing bucket's
/// behavior.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> StoreResult<String>;
    async fn delete(&self, url: &str) -> StoreResult<()>;
}

/// In-memory image store issuing `memory://` URLs. Tests/dev only.
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.objects.lock().unwrap().contains_key(url)
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        if bytes.is_empty() {
            return Err(StoreError::Backend("empty image payload".into()));
        }
        let url = format!("memory://images/{}", uuid::Uuid::now_v7());
        self.objects
            .lock()
            .unwrap()
            .insert(url.clone(), (bytes, content_type.to_string()));
        Ok(url)
    }

    async fn delete(&self, url: &str) -> StoreResult<()> {
        self.objects.lock().unwrap().remove(url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_returns_a_resolvable_url() {
        let store = InMemoryImageStore::new();
        let url = store.upload(vec![1, 2, 3], "image/png").await.unwrap();
        assert!(url.starts_with("memory://images/"));
        assert!(store.contains(&url));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryImageStore::new();
        let url = store.upload(vec![1], "image/png").await.unwrap();
        store.delete(&url).await.unwrap();
        store.delete(&url).await.unwrap();
        assert!(!store.contains(&url));
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let store = InMemoryImageStore::new();
        assert!(store.upload(vec![], "image/png").await.is_err());
    }
}
