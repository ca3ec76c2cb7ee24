//! Image transcoder - produces every variant of a source image
//!
//! The source is decoded once; each variant is resized from the decoded
//! source (never from a previous variant) and encoded in the source's own
//! format. Any encode failure aborts the whole set.

use crate::error::TranscodeError;
use crate::image::processor::ImageProcessor;
use crate::image::resize::ImageResize;
use crate::metadata::{ImageBuffer, ImageMetadata};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use resizer_core::VariantSpec;
use std::io::Cursor;

const JPEG_QUALITY: u8 = 85;

/// Every variant of one source, in the order requested
#[derive(Debug, Clone)]
pub struct Transcoded {
    pub source: ImageMetadata,
    pub variants: Vec<(ImageBuffer, VariantSpec)>,
}

/// Main image transcoder
pub struct ImageTranscoder;

impl ImageTranscoder {
    /// Resize `data` into every variant, in the given order.
    ///
    /// `content_type` is the source object's content type; every variant is
    /// tagged with it as given since the format never changes.
    pub fn transcode(
        data: &[u8],
        content_type: &str,
        variants: &[VariantSpec],
    ) -> Result<Transcoded, TranscodeError> {
        let (img, format) = ImageProcessor::decode(data)?;
        let source = ImageProcessor::describe(&img, format, data.len());

        tracing::debug!(
            width = source.width,
            height = source.height,
            format = %source.format,
            variants = variants.len(),
            "Decoded source image"
        );

        let variants = variants
            .iter()
            .map(|variant| {
                let buffer = Self::render(&img, format, content_type, variant)?;
                Ok((buffer, variant.clone()))
            })
            .collect::<Result<Vec<_>, TranscodeError>>()?;

        Ok(Transcoded { source, variants })
    }

    fn render(
        img: &DynamicImage,
        format: ImageFormat,
        content_type: &str,
        variant: &VariantSpec,
    ) -> Result<ImageBuffer, TranscodeError> {
        if variant.max_width == 0 || variant.max_height == 0 {
            return Err(TranscodeError::InvalidTarget {
                label: variant.label.clone(),
                width: variant.max_width,
                height: variant.max_height,
            });
        }

        let (orig_width, orig_height) = img.dimensions();
        let (width, height) =
            ImageResize::fit_within(orig_width, orig_height, variant.max_width, variant.max_height);
        let resized = ImageResize::resize_image(img, width, height);

        let data = Self::encode(&resized, format).map_err(|e| TranscodeError::Encode {
            label: variant.label.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            variant = %variant.label,
            width,
            height,
            size_bytes = data.len(),
            "Encoded variant"
        );

        Ok(ImageBuffer {
            data,
            content_type: content_type.to_string(),
            width,
            height,
        })
    }

    fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Bytes, image::ImageError> {
        let (width, height) = img.dimensions();
        let estimated_size = width as usize * height as usize * 3;
        let mut buffer = Vec::with_capacity(estimated_size);
        let mut cursor = Cursor::new(&mut buffer);

        match format {
            ImageFormat::Jpeg => {
                // JPEG carries no alpha channel
                let rgb = if img.color().has_alpha() {
                    DynamicImage::ImageRgb8(img.to_rgb8())
                } else {
                    img.clone()
                };
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY))?;
            }
            other => img.write_to(&mut cursor, other)?,
        }

        Ok(Bytes::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 120, 200])));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    fn dims_and_format(data: &[u8]) -> ((u32, u32), ImageFormat) {
        let (img, format) = ImageProcessor::decode(data).unwrap();
        (img.dimensions(), format)
    }

    #[test]
    fn test_transcode_fits_each_box() {
        let source = encoded(1000, 500, ImageFormat::Png);
        let variants = vec![
            VariantSpec::square("square", 500),
            VariantSpec::new("tall", 800, 1920, "800"),
        ];

        let transcoded = ImageTranscoder::transcode(&source, "image/png", &variants).unwrap();
        assert_eq!((transcoded.source.width, transcoded.source.height), (1000, 500));
        assert_eq!(transcoded.source.size_bytes, source.len() as u64);
        let outputs = transcoded.variants;

        assert_eq!(outputs.len(), 2);
        assert_eq!((outputs[0].0.width, outputs[0].0.height), (500, 250));
        assert_eq!((outputs[1].0.width, outputs[1].0.height), (800, 400));
        assert_eq!(outputs[0].1.label, "square");
        assert_eq!(outputs[1].1.label, "tall");

        assert_eq!(dims_and_format(&outputs[0].0.data), ((500, 250), ImageFormat::Png));
        assert_eq!(dims_and_format(&outputs[1].0.data), ((800, 400), ImageFormat::Png));
    }

    #[test]
    fn test_transcode_keeps_source_format_and_content_type() {
        for (format, content_type) in [
            (ImageFormat::Jpeg, "image/jpeg"),
            (ImageFormat::Bmp, "image/bmp"),
        ] {
            let source = encoded(400, 300, format);
            let outputs =
                ImageTranscoder::transcode(&source, content_type, &[VariantSpec::square("thumb", 200)])
                    .unwrap()
                    .variants;

            let (buffer, _) = &outputs[0];
            assert_eq!(buffer.content_type, content_type);
            assert_eq!(dims_and_format(&buffer.data), ((200, 150), format));
        }
    }

    #[test]
    fn test_transcode_passes_content_type_through() {
        let source = encoded(40, 40, ImageFormat::Png);
        for given in ["application/octet-stream", "image/x-png"] {
            let outputs =
                ImageTranscoder::transcode(&source, given, &[VariantSpec::square("thumb", 20)])
                    .unwrap()
                    .variants;
            assert_eq!(outputs[0].0.content_type, given);
            assert_eq!(dims_and_format(&outputs[0].0.data).1, ImageFormat::Png);
        }
    }

    #[test]
    fn test_transcode_png_with_alpha() {
        let img = RgbaImage::from_pixel(64, 32, Rgba([0, 0, 0, 0]));
        let mut source = Vec::new();
        img.write_to(&mut Cursor::new(&mut source), ImageFormat::Png).unwrap();

        let outputs =
            ImageTranscoder::transcode(&source, "image/png", &[VariantSpec::square("thumb", 16)])
                .unwrap()
                .variants;
        assert_eq!((outputs[0].0.width, outputs[0].0.height), (16, 8));
    }

    #[test]
    fn test_transcode_enlarges_small_source() {
        let source = encoded(50, 25, ImageFormat::Png);
        let outputs =
            ImageTranscoder::transcode(&source, "image/png", &[VariantSpec::square("full", 640)])
                .unwrap()
                .variants;
        assert_eq!((outputs[0].0.width, outputs[0].0.height), (640, 320));
    }

    #[test]
    fn test_transcode_many_variants_in_order() {
        let source = encoded(300, 300, ImageFormat::Png);
        let variants: Vec<_> = (1..=5).map(|i| VariantSpec::square(&format!("v{i}"), i * 10)).collect();

        let outputs = ImageTranscoder::transcode(&source, "image/png", &variants)
            .unwrap()
            .variants;
        let widths: Vec<_> = outputs.iter().map(|(b, _)| b.width).collect();
        assert_eq!(widths, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_transcode_rejects_garbage() {
        let result = ImageTranscoder::transcode(b"definitely not pixels", "image/png", &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_box_aborts_whole_set() {
        let source = encoded(100, 100, ImageFormat::Png);
        let variants = vec![VariantSpec::square("ok", 50), VariantSpec::new("bad", 0, 50, "0")];
        let result = ImageTranscoder::transcode(&source, "image/png", &variants);
        assert!(matches!(result, Err(TranscodeError::InvalidTarget { .. })));
    }
}
