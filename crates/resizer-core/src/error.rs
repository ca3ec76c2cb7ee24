//! Error types module
//!
//! Every stage of the resize pipeline reports failures through its own error
//! enum. They all implement [`ErrorClass`] so the orchestrator can log and
//! report them uniformly: which class of failure it was, whether the trigger
//! layer could plausibly retry it, and at which level it should be logged.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warning level - for bad input that will never succeed
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Broad failure classes of a pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Unmatched category, missing extension, unsupported type, bucket misconfiguration.
    InputValidation,
    /// The image bytes could not be decoded or re-encoded.
    Unprocessable,
    /// Storage or metadata store failure; the trigger layer may retry.
    Transient,
    /// Deployment misconfiguration detected at write time (e.g. no metadata table).
    Configuration,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InputValidation => "input_validation",
            FailureKind::Unprocessable => "unprocessable",
            FailureKind::Transient => "transient",
            FailureKind::Configuration => "configuration",
        }
    }
}

/// Classification shared by all pipeline error types
pub trait ErrorClass {
    /// Failure class of this error
    fn kind(&self) -> FailureKind;

    /// Whether retrying the same invocation could succeed
    fn is_retryable(&self) -> bool {
        self.kind() == FailureKind::Transient
    }

    /// Log level for this error
    fn log_level(&self) -> LogLevel {
        match self.kind() {
            FailureKind::InputValidation | FailureKind::Unprocessable => LogLevel::Warn,
            FailureKind::Transient | FailureKind::Configuration => LogLevel::Error,
        }
    }
}

/// Errors raised while turning a source descriptor into a resize plan.
///
/// All of these are detected before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Object key is not valid UTF-8 once decoded: {0}")]
    InvalidKeyEncoding(String),

    #[error("Invalid source bucket key: no category matches {0}")]
    InvalidCategory(String),

    #[error("Source and destination buckets are the same: {0}")]
    SameBucket(String),

    #[error("Could not determine the image type of {0}")]
    NoExtension(String),

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Object key {key} has no record id before the {marker} marker")]
    MissingRecordMarker { key: String, marker: String },

    #[error("Invalid naming configuration: {0}")]
    InvalidConfig(String),
}

impl ErrorClass for ResolveError {
    fn kind(&self) -> FailureKind {
        match self {
            ResolveError::InvalidConfig(_) => FailureKind::Configuration,
            _ => FailureKind::InputValidation,
        }
    }
}
