use crate::traits::{ObjectStorage, StorageError, StorageResult, StoredObject, DEFAULT_CONTENT_TYPE};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// S3 storage implementation
///
/// `object_store` clients are bound to one bucket, so a client is built on
/// first use of each bucket and reused afterwards.
pub struct S3Storage {
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    clients: RwLock<HashMap<String, Arc<AmazonS3>>>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO, "http://localhost:4566" for LocalStack)
    pub fn new(region: String, endpoint_url: Option<String>) -> Self {
        S3Storage {
            region,
            endpoint_url,
            clients: RwLock::new(HashMap::new()),
        }
    }

    fn build_client(&self, bucket: &str) -> StorageResult<AmazonS3> {
        // Credentials come from the environment (AWS_ACCESS_KEY_ID, role, ...)
        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket.to_string());

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    /// Store path for `key`, or `InvalidKey` when the store would address a
    /// different object (empty segments, `.`/`..` segments, leading or
    /// trailing `/`, control characters).
    fn object_path(key: &str) -> StorageResult<Path> {
        // `Path::from` would percent-escape `%`, `#`, `[` ...; `parse` keeps the key raw
        match Path::parse(key) {
            Ok(path) if path.as_ref() == key => Ok(path),
            _ => Err(StorageError::InvalidKey(format!(
                "Key cannot be addressed exactly in S3: {}",
                key
            ))),
        }
    }

    async fn client(&self, bucket: &str) -> StorageResult<Arc<AmazonS3>> {
        if let Some(client) = self.clients.read().await.get(bucket) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(self.build_client(bucket)?);
        let mut clients = self.clients.write().await;
        Ok(Arc::clone(
            clients.entry(bucket.to_string()).or_insert(client),
        ))
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn fetch(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        let location = Self::object_path(key)?;
        let start = std::time::Instant::now();
        let client = self.client(bucket).await?;

        let result: ObjectResult<_> = client.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 fetch failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| {
                let content_type: &str = value;
                content_type.to_string()
            })
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let data = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = data.len(),
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 fetch successful"
        );

        Ok(StoredObject { data, content_type })
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let location = Self::object_path(key)?;
        let start = std::time::Instant::now();
        let client = self.client(bucket).await?;
        let size = data.len() as u64;

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );

        let result: ObjectResult<_> = client
            .put_opts(&location, PutPayload::from(data), PutOptions::from(attributes))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 store failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 store successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
