//! Image processing module
//!
//! - Format sniffing, decoding and metadata (processor)
//! - Aspect-preserving dimension math and resampling (resize)
//! - Multi-variant decode/resize/encode (transcoder)

pub mod processor;
pub mod resize;
pub mod transcoder;

pub use processor::ImageProcessor;
pub use resize::ImageResize;
pub use transcoder::{ImageTranscoder, Transcoded};
