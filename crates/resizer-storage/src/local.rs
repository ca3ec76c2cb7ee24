use crate::traits::{content_type_for_key, ObjectStorage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Buckets are directories under `base_path`; no metadata is kept, so the
/// content type of a fetched object is inferred from its key.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory holding one sub-directory per bucket
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Map `(bucket, key)` to a path under the base directory.
    ///
    /// Rejects anything that could escape the base directory.
    fn key_to_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        for part in [bucket, key] {
            let parent_segment = part.split('/').any(|segment| segment == "..");
            if part.is_empty() || parent_segment || part.starts_with('/') {
                return Err(StorageError::InvalidKey(format!(
                    "Storage key contains invalid characters: {}/{}",
                    bucket, key
                )));
            }
        }
        if bucket.contains('/') {
            return Err(StorageError::InvalidKey(format!(
                "Bucket name must not contain '/': {}",
                bucket
            )));
        }

        Ok(self.base_path.join(bucket).join(key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn fetch(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        let path = self.key_to_path(bucket, key)?;
        let start = std::time::Instant::now();

        let data = fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            )),
        })?;

        tracing::info!(
            path = %path.display(),
            bucket = %bucket,
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage fetch successful"
        );

        Ok(StoredObject {
            data: Bytes::from(data),
            content_type: content_type_for_key(key).to_string(),
        })
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<()> {
        let path = self.key_to_path(bucket, key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage store successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
