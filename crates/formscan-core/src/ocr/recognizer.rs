//! The OCR capability behind text extraction.

use image::GrayImage;

use crate::error::ExtractionError;
use crate::models::run::TextToken;

/// An OCR backend that turns a preprocessed image into text tokens.
///
/// Implementations return tokens in their native reading order and do not
/// filter them; filtering happens in [`TextExtractor`](super::TextExtractor).
pub trait TextRecognizer {
    /// Short engine name shown in reports.
    fn name(&self) -> &str;

    /// Configuration string for `languages`, shown in reports.
    fn describe(&self, languages: &str) -> String;

    /// Recognize text in a single-channel image.
    fn recognize(
        &self,
        image: &GrayImage,
        languages: &str,
    ) -> Result<Vec<TextToken>, ExtractionError>;
}

impl<R: TextRecognizer + ?Sized> TextRecognizer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn describe(&self, languages: &str) -> String {
        (**self).describe(languages)
    }

    fn recognize(
        &self,
        image: &GrayImage,
        languages: &str,
    ) -> Result<Vec<TextToken>, ExtractionError> {
        (**self).recognize(image, languages)
    }
}
