//! Resizer Image Processing Library
//!
//! Decodes a source raster, fits it into each variant's bounding box while
//! preserving aspect ratio, and re-encodes every variant in the source format.

pub mod error;
pub mod image;
pub mod metadata;

// Re-export commonly used types
pub use error::TranscodeError;
pub use crate::image::{ImageProcessor, ImageResize, ImageTranscoder, Transcoded};
pub use metadata::{ImageBuffer, ImageMetadata};
