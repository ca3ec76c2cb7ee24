//! Resizer Storage Library
//!
//! Object storage gateway used by the resize pipeline: fetch an original,
//! store a variant. Objects are addressed by `(bucket, key)` so one gateway
//! serves both the source and the destination bucket.
//!
//! Backends:
//! - **S3** (`storage-s3`): `object_store` client per bucket
//! - **Local** (`storage-local`): `{base_path}/{bucket}/{key}` on disk
//! - **Memory** (`storage-memory`): in-process map, for tests and dry runs

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
pub use resizer_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{content_type_for_key, ObjectStorage, StorageError, StorageResult, StoredObject};
