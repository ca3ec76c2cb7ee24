use resizer_core::{ErrorClass, FailureKind, ResolveError};
use resizer_metadata::MetadataError;
use resizer_processing::TranscodeError;
use resizer_storage::StorageError;
use serde::Serialize;
use thiserror::Error;

/// Pipeline stage at which an invocation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Receive,
    Resolve,
    Fetch,
    Transcode,
    Upload,
    Record,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Receive => "receive",
            Stage::Resolve => "resolve",
            Stage::Fetch => "fetch",
            Stage::Transcode => "transcode",
            Stage::Upload => "upload",
            Stage::Record => "record",
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Malformed notification: {0}")]
    Notification(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to fetch source image: {0}")]
    Fetch(#[source] StorageError),

    #[error("Failed to transcode image: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("Transcode task failed: {0}")]
    TaskFailed(String),

    #[error("Failed to upload {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to record metadata: {0}")]
    Record(#[from] MetadataError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Notification(_) => Stage::Receive,
            PipelineError::Resolve(_) => Stage::Resolve,
            PipelineError::Fetch(_) => Stage::Fetch,
            PipelineError::Transcode(_) | PipelineError::TaskFailed(_) => Stage::Transcode,
            PipelineError::Upload { .. } => Stage::Upload,
            PipelineError::Record(_) => Stage::Record,
        }
    }
}

impl ErrorClass for PipelineError {
    fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Notification(_) => FailureKind::InputValidation,
            PipelineError::Resolve(e) => e.kind(),
            PipelineError::Fetch(e) => e.kind(),
            PipelineError::Transcode(e) => e.kind(),
            // a panicked or cancelled blocking task
            PipelineError::TaskFailed(_) => FailureKind::Transient,
            PipelineError::Upload { source, .. } => source.kind(),
            PipelineError::Record(e) => e.kind(),
        }
    }
}
