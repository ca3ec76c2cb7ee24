//! Storage abstraction trait
//!
//! This module defines the `ObjectStorage` trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use resizer_core::{ErrorClass, FailureKind};
use thiserror::Error;

/// Fallback when neither the store nor the key tells us the content type
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ErrorClass for StorageError {
    fn kind(&self) -> FailureKind {
        match self {
            StorageError::NotFound { .. } | StorageError::InvalidKey(_) => {
                FailureKind::InputValidation
            }
            StorageError::ConfigError(_) => FailureKind::Configuration,
            StorageError::UploadFailed(_)
            | StorageError::DownloadFailed(_)
            | StorageError::IoError(_) => FailureKind::Transient,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Raw object bytes with their content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Storage abstraction trait
///
/// Both operations complete (or fail) before returning and never retry;
/// failures go straight back to the caller.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fetch an object and its content type
    async fn fetch(&self, bucket: &str, key: &str) -> StorageResult<StoredObject>;

    /// Store an object, overwriting any previous object at the same key
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Content type implied by a key's extension, for backends that keep no metadata.
pub fn content_type_for_key(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpe" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
