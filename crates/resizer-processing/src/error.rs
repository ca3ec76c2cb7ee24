use resizer_core::{ErrorClass, FailureKind};

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("Failed to encode variant {label}: {message}")]
    Encode { label: String, message: String },

    #[error("Invalid target box for variant {label}: {width}x{height}")]
    InvalidTarget {
        label: String,
        width: u32,
        height: u32,
    },
}

impl ErrorClass for TranscodeError {
    fn kind(&self) -> FailureKind {
        FailureKind::Unprocessable
    }
}
