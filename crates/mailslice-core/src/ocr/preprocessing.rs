//! Image enhancement applied to a rendered page before OCR.
//!
//! Contrast and sharpness follow the usual "enhance" model: the output is a
//! blend between a degenerate image and the input, `degenerate + factor *
//! (input - degenerate)`. For contrast the degenerate image is flat grey at
//! the mean luminance; for sharpness it is a 3x3 smoothed copy.

use image::{imageops, DynamicImage, GenericImageView, GrayImage, ImageBuffer, Pixel};
use tracing::debug;

use crate::models::config::PreprocessConfig;

/// Smoothing kernel used as the sharpness baseline.
const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

/// Page image enhancer for the OCR pipeline.
#[derive(Debug, Clone)]
pub struct ImageEnhancer {
    config: PreprocessConfig,
    /// Longest side allowed; larger images are scaled down first.
    max_size: Option<u32>,
}

impl ImageEnhancer {
    pub fn new(config: PreprocessConfig) -> Self {
        Self {
            config,
            max_size: None,
        }
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = Some(size);
        self
    }

    /// Run the configured enhancement steps.
    pub fn enhance(&self, image: &DynamicImage) -> DynamicImage {
        let image = self.fit(image);
        let (width, height) = image.dimensions();
        debug!(
            "Enhancing {}x{} image (grayscale: {}, contrast: {}, sharpness: {})",
            width, height, self.config.grayscale, self.config.contrast, self.config.sharpness
        );

        if self.config.grayscale {
            let mut gray = image.to_luma8();
            adjust_contrast(&mut gray, self.config.contrast);
            let gray = adjust_sharpness(gray, self.config.sharpness);
            DynamicImage::ImageLuma8(gray)
        } else {
            let mut rgb = image.to_rgb8();
            let mean = mean_luma(&image.to_luma8());
            if self.config.contrast != 1.0 {
                blend_towards(&mut rgb, |_| mean, self.config.contrast);
            }
            let rgb = adjust_sharpness(rgb, self.config.sharpness);
            DynamicImage::ImageRgb8(rgb)
        }
    }

    fn fit(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        match self.max_size {
            Some(max) if width.max(height) > max => {
                debug!("Scaling {}x{} down to fit {}", width, height, max);
                image.resize(max, max, imageops::FilterType::Lanczos3)
            }
            _ => image.clone(),
        }
    }
}

impl Default for ImageEnhancer {
    fn default() -> Self {
        Self::new(PreprocessConfig::default())
    }
}

fn mean_luma(image: &GrayImage) -> u8 {
    let pixels = image.as_raw();
    if pixels.is_empty() {
        return 0;
    }
    let sum: u64 = pixels.iter().map(|&p| p as u64).sum();
    (sum as f64 / pixels.len() as f64 + 0.5) as u8
}

fn adjust_contrast(image: &mut GrayImage, factor: f32) {
    if factor == 1.0 {
        return;
    }
    let mean = mean_luma(image);
    blend_towards(image, |_| mean, factor);
}

/// Blend a smoothed copy into the image. Border pixels keep their values.
fn adjust_sharpness<P>(image: ImageBuffer<P, Vec<u8>>, factor: f32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = image.dimensions();
    if factor == 1.0 || width < 3 || height < 3 {
        return image;
    }

    let mut smoothed = imageops::filter3x3(&image, &SMOOTH_KERNEL);
    for (x, y, pixel) in smoothed.enumerate_pixels_mut() {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            *pixel = *image.get_pixel(x, y);
        }
    }

    let mut out = image;
    let baseline = smoothed.into_raw();
    blend_towards(&mut out, |i| baseline[i], factor);
    out
}

fn blend_towards(pixels: &mut [u8], degenerate: impl Fn(usize) -> u8, factor: f32) {
    for (i, value) in pixels.iter_mut().enumerate() {
        let base = degenerate(i) as f32;
        let blended = base + factor * (*value as f32 - base);
        *value = blended.round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn config(contrast: f32, sharpness: f32) -> PreprocessConfig {
        PreprocessConfig {
            grayscale: true,
            contrast,
            sharpness,
        }
    }

    #[test]
    fn test_contrast_stretches_around_mean() {
        let mut image = GrayImage::new(2, 1);
        image.put_pixel(0, 0, Luma([100]));
        image.put_pixel(1, 0, Luma([200]));

        let enhanced = ImageEnhancer::new(config(2.0, 1.0))
            .enhance(&DynamicImage::ImageLuma8(image))
            .to_luma8();
        assert_eq!(enhanced.get_pixel(0, 0)[0], 50);
        assert_eq!(enhanced.get_pixel(1, 0)[0], 250);
    }

    #[test]
    fn test_contrast_clamps() {
        let mut image = GrayImage::new(2, 1);
        image.put_pixel(0, 0, Luma([0]));
        image.put_pixel(1, 0, Luma([255]));

        let enhanced = ImageEnhancer::new(config(4.0, 1.0))
            .enhance(&DynamicImage::ImageLuma8(image))
            .to_luma8();
        assert_eq!(enhanced.get_pixel(0, 0)[0], 0);
        assert_eq!(enhanced.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_neutral_factors_leave_pixels_unchanged() {
        let image = GrayImage::from_fn(5, 5, |x, y| Luma([(x * 40 + y * 7) as u8]));
        let enhanced = ImageEnhancer::new(config(1.0, 1.0))
            .enhance(&DynamicImage::ImageLuma8(image.clone()))
            .to_luma8();
        assert_eq!(enhanced, image);
    }

    #[test]
    fn test_sharpness_keeps_flat_image_flat() {
        let image = GrayImage::from_pixel(6, 6, Luma([128]));
        let enhanced = ImageEnhancer::new(config(1.0, 2.0))
            .enhance(&DynamicImage::ImageLuma8(image.clone()))
            .to_luma8();
        assert_eq!(enhanced, image);
    }

    #[test]
    fn test_sharpness_boosts_isolated_dot() {
        let mut image = GrayImage::from_pixel(5, 5, Luma([0]));
        image.put_pixel(2, 2, Luma([130]));

        let enhanced = ImageEnhancer::new(config(1.0, 2.0))
            .enhance(&DynamicImage::ImageLuma8(image))
            .to_luma8();
        assert!(enhanced.get_pixel(2, 2)[0] > 130);
        assert_eq!(enhanced.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_rgb_input_becomes_grayscale() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([10, 200, 30])));
        let enhanced = ImageEnhancer::default().enhance(&image);
        assert!(matches!(enhanced, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_max_size_scales_down() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(400, 200));
        let enhanced = ImageEnhancer::new(config(1.0, 1.0))
            .with_max_size(100)
            .enhance(&image);
        assert_eq!(enhanced.dimensions(), (100, 50));
    }
}
