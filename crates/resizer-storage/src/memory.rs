//! In-memory storage
//!
//! Keeps objects in a map keyed by `(bucket, key)`. Used by tests and by the
//! worker's dry-run mode. Counts operations and can be told to fail specific
//! stores so failure paths can be exercised without a real backend.

use crate::traits::{ObjectStorage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

type ObjectKey = (String, String);

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<ObjectKey, StoredObject>>,
    failing_keys: Mutex<HashSet<String>>,
    stored: Mutex<Vec<ObjectKey>>,
    fetches: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object
    pub async fn insert(&self, bucket: &str, key: &str, data: impl Into<Bytes>, content_type: &str) {
        self.objects.lock().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Make every later `store` to `key` (in any bucket) fail with `UploadFailed`
    pub async fn fail_store_for(&self, key: &str) {
        self.failing_keys.lock().await.insert(key.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Successful stores, in call order
    pub async fn stored(&self) -> Vec<(String, String)> {
        self.stored.lock().await.clone()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn fetch(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        if self.failing_keys.lock().await.contains(key) {
            return Err(StorageError::UploadFailed(format!(
                "injected failure for {}/{}",
                bucket, key
            )));
        }

        let object_key = (bucket.to_string(), key.to_string());
        self.objects.lock().await.insert(
            object_key.clone(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        self.stored.lock().await.push(object_key);

        tracing::debug!(bucket = %bucket, key = %key, "Memory storage store");
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
