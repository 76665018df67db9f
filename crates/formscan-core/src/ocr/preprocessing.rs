//! Image preprocessing for OCR.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

/// Grayscale conversion followed by global Otsu binarization.
pub struct ImagePreprocessor {
    /// Apply thresholding after grayscale conversion.
    binarize: bool,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self { binarize: true }
    }

    /// Enable or disable binarization.
    pub fn with_binarization(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }

    /// Prepare a region for recognition.
    pub fn preprocess(&self, image: &DynamicImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let gray = image.to_luma8();

        if !self.binarize {
            return gray;
        }

        let threshold = otsu_threshold(&gray);
        debug!("Otsu threshold for {}x{} region: {}", width, height, threshold);

        binarize(&gray, threshold)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the threshold that maximizes between-class variance of the histogram.
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }

    let weighted_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0.0f64;
    let mut best_variance = 0.0f64;
    let mut threshold = 0u8;

    for (level, &count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += level as f64 * count as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (weighted_sum - background_sum) / foreground_weight as f64;
        let diff = background_mean - foreground_mean;
        let variance = background_weight as f64 * foreground_weight as f64 * diff * diff;

        if variance > best_variance {
            best_variance = variance;
            threshold = level as u8;
        }
    }

    threshold
}

/// Pixels above `threshold` become white, the rest black.
pub fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let output = if pixel[0] > threshold { 255 } else { 0 };
        result.put_pixel(x, y, Luma([output]));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn two_tone(dark: u8, light: u8) -> GrayImage {
        GrayImage::from_fn(20, 10, |x, _| if x < 10 { Luma([dark]) } else { Luma([light]) })
    }

    #[test]
    fn test_otsu_separates_two_tones() {
        let threshold = otsu_threshold(&two_tone(20, 220));
        assert!((20..220).contains(&threshold));

        // Threshold follows the data rather than a fixed constant
        let threshold = otsu_threshold(&two_tone(150, 250));
        assert!((150..250).contains(&threshold));
    }

    #[test]
    fn test_preprocess_outputs_binary_image() {
        let rgb = RgbImage::from_fn(20, 10, |x, y| {
            if (x + y) % 3 == 0 {
                Rgb([30, 40, 35])
            } else {
                Rgb([200, 210, 190])
            }
        });
        let processed = ImagePreprocessor::new().preprocess(&DynamicImage::ImageRgb8(rgb));

        assert_eq!(processed.dimensions(), (20, 10));
        assert!(processed.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(processed.get_pixel(0, 0)[0], 0);
        assert_eq!(processed.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_preprocess_without_binarization() {
        let image = DynamicImage::ImageLuma8(two_tone(100, 120));
        let processed = ImagePreprocessor::new()
            .with_binarization(false)
            .preprocess(&image);
        assert_eq!(processed.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_empty_image_threshold() {
        assert_eq!(otsu_threshold(&GrayImage::new(0, 0)), 0);
    }
}
