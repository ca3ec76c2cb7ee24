//! Image processor - format sniffing, decoding and metadata

use crate::error::TranscodeError;
use crate::metadata::ImageMetadata;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Sniff the format from the bytes and decode the image.
    pub fn decode(data: &[u8]) -> Result<(DynamicImage, ImageFormat), TranscodeError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| TranscodeError::Decode(e.to_string()))?;
        let format = reader.format().ok_or(TranscodeError::UnknownFormat)?;
        let img = reader
            .decode()
            .map_err(|e| TranscodeError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(TranscodeError::Decode(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        Ok((img, format))
    }

    /// Intrinsic properties of a decoded image, `size_bytes` being its encoded size
    pub fn describe(img: &DynamicImage, format: ImageFormat, size_bytes: usize) -> ImageMetadata {
        let (width, height) = img.dimensions();

        ImageMetadata {
            width,
            height,
            format: format!("{:?}", format),
            size_bytes: size_bytes as u64,
        }
    }
}
