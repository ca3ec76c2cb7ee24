use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Fit `(orig_width, orig_height)` inside a `max_width` x `max_height` box.
    ///
    /// Both dimensions are scaled by `min(max_width / orig_width, max_height / orig_height)`
    /// and rounded, so at least one side touches the box and the aspect ratio is kept.
    /// Sources smaller than the box are enlarged proportionally.
    ///
    /// All arguments must be non-zero.
    pub fn fit_within(
        orig_width: u32,
        orig_height: u32,
        max_width: u32,
        max_height: u32,
    ) -> (u32, u32) {
        let scale = (max_width as f64 / orig_width as f64).min(max_height as f64 / orig_height as f64);

        let width = (orig_width as f64 * scale).round() as u32;
        let height = (orig_height as f64 * scale).round() as u32;

        (width.clamp(1, max_width), height.clamp(1, max_height))
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Resize image to exact dimensions
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        if (orig_width, orig_height) == (width, height) {
            return img.clone();
        }
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }
}
