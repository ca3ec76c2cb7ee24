//! Image metadata and buffer types

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Intrinsic properties of a decoded raster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub size_bytes: u64,
}

/// Encoded image bytes with the properties inferred from them.
///
/// Owned by a single pipeline invocation and never persisted as-is; only the
/// variants produced from it are stored.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub data: Bytes,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

impl ImageBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_metadata_serialization() {
        let metadata = ImageMetadata {
            width: 1920,
            height: 1080,
            format: "Jpeg".to_string(),
            size_bytes: 1024000,
        };

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: ImageMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(metadata, deserialized);
    }

    #[test]
    fn test_buffer_len() {
        let buffer = ImageBuffer {
            data: Bytes::from_static(b"abc"),
            content_type: "image/png".to_string(),
            width: 1,
            height: 1,
        };
        assert_eq!(buffer.len(), 3);
        assert!(!buffer.is_empty());
    }
}
