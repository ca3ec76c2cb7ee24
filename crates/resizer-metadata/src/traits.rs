//! Metadata recorder trait

use crate::MetadataBackend;
use async_trait::async_trait;
use resizer_core::{ErrorClass, FailureKind, MetadataRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    /// The source bucket matched no table rule. This is a deployment
    /// problem, never a silent skip.
    #[error("No metadata table configured for record {id}")]
    MissingTable { id: String },

    #[error("Invalid table name: {0}")]
    InvalidTable(String),

    #[error("Failed to write record {id} to {table}: {message}")]
    WriteFailed {
        table: String,
        id: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ErrorClass for MetadataError {
    fn kind(&self) -> FailureKind {
        match self {
            MetadataError::WriteFailed { .. } => FailureKind::Transient,
            MetadataError::MissingTable { .. }
            | MetadataError::InvalidTable(_)
            | MetadataError::ConfigError(_) => FailureKind::Configuration,
        }
    }
}

pub type MetadataResult<T> = Result<T, MetadataError>;

/// Writes metadata records
///
/// A `put` either lands the whole record or fails; there is no retry inside
/// the recorder.
#[async_trait]
pub trait MetadataRecorder: Send + Sync {
    /// Upsert `record` into `record.table`
    async fn put(&self, record: &MetadataRecord) -> MetadataResult<()>;

    fn backend_type(&self) -> MetadataBackend;
}

/// Table name of `record`, or `MissingTable` when it has none
pub fn require_table(record: &MetadataRecord) -> MetadataResult<&str> {
    if record.table.is_empty() {
        return Err(MetadataError::MissingTable {
            id: record.id.clone(),
        });
    }
    Ok(&record.table)
}
