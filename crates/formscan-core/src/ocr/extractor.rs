//! Text extraction engine: preprocessing, recognition and token filtering.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::models::run::TextToken;

use super::preprocessing::ImagePreprocessor;
use super::recognizer::TextRecognizer;

/// Extracts filtered text tokens from a cropped region.
pub struct TextExtractor<R: TextRecognizer> {
    recognizer: R,
    preprocessor: ImagePreprocessor,
    languages: String,
}

/// Builder for TextExtractor.
pub struct TextExtractorBuilder<R: TextRecognizer> {
    recognizer: R,
    preprocessor: ImagePreprocessor,
    languages: String,
}

impl<R: TextRecognizer> TextExtractorBuilder<R> {
    /// Create a new builder around a recognizer.
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            preprocessor: ImagePreprocessor::new(),
            languages: "eng".to_string(),
        }
    }

    /// Set the language/script mix passed to the recognizer.
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }

    /// Set the preprocessor.
    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Build the extractor.
    pub fn build(self) -> TextExtractor<R> {
        TextExtractor {
            recognizer: self.recognizer,
            preprocessor: self.preprocessor,
            languages: self.languages,
        }
    }
}

impl<R: TextRecognizer> TextExtractor<R> {
    /// Create a new builder.
    pub fn builder(recognizer: R) -> TextExtractorBuilder<R> {
        TextExtractorBuilder::new(recognizer)
    }

    /// Create an extractor with default preprocessing.
    pub fn new(recognizer: R, languages: impl Into<String>) -> Self {
        Self::builder(recognizer).with_languages(languages).build()
    }

    /// Preprocess a region, recognize it and keep only usable tokens.
    ///
    /// Tokens keep the recognizer's reading order.
    pub fn extract(&self, region: &DynamicImage) -> Result<Vec<TextToken>, ExtractionError> {
        let start = Instant::now();
        let (width, height) = region.dimensions();
        if width == 0 || height == 0 {
            return Err(ExtractionError::Preprocessing(format!(
                "empty region {}x{}",
                width, height
            )));
        }

        let processed = self.preprocessor.preprocess(region);
        let raw = self.recognizer.recognize(&processed, &self.languages)?;
        let raw_count = raw.len();

        let tokens = filter_tokens(raw);

        debug!(
            "Extracted {} of {} tokens from {}x{} region in {}ms",
            tokens.len(),
            raw_count,
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(tokens)
    }

    /// Name of the underlying OCR engine.
    pub fn engine_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Configuration string of the underlying OCR engine.
    pub fn engine_config(&self) -> String {
        self.recognizer.describe(&self.languages)
    }
}

/// Drop tokens with non-positive confidence or blank text, trimming the rest.
pub fn filter_tokens(raw: Vec<TextToken>) -> Vec<TextToken> {
    raw.into_iter()
        .filter_map(|mut token| {
            if token.confidence <= 0 {
                return None;
            }
            let trimmed = token.text.trim();
            if trimmed.is_empty() {
                trace!("Dropping blank token at ({}, {})", token.x, token.y);
                return None;
            }
            if trimmed.len() != token.text.len() {
                token.text = trimmed.to_string();
            }
            Some(token)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn token(text: &str, confidence: i32) -> TextToken {
        TextToken {
            text: text.to_string(),
            x: 0,
            y: 0,
            width: 10,
            height: 10,
            confidence,
        }
    }

    struct FixedRecognizer {
        tokens: Vec<TextToken>,
        seen_binary: Cell<bool>,
    }

    impl TextRecognizer for FixedRecognizer {
        fn name(&self) -> &str {
            "fixed"
        }

        fn describe(&self, languages: &str) -> String {
            format!("fixed -l {}", languages)
        }

        fn recognize(
            &self,
            image: &GrayImage,
            _languages: &str,
        ) -> Result<Vec<TextToken>, ExtractionError> {
            self.seen_binary
                .set(image.pixels().all(|p| p[0] == 0 || p[0] == 255));
            Ok(self.tokens.clone())
        }
    }

    struct BrokenRecognizer;

    impl TextRecognizer for BrokenRecognizer {
        fn name(&self) -> &str {
            "broken"
        }

        fn describe(&self, _languages: &str) -> String {
            String::new()
        }

        fn recognize(
            &self,
            _image: &GrayImage,
            _languages: &str,
        ) -> Result<Vec<TextToken>, ExtractionError> {
            Err(ExtractionError::Unavailable("no engine".to_string()))
        }
    }

    #[test]
    fn test_filter_tokens() {
        let tokens = filter_tokens(vec![
            token("Total", 1),
            token("ghost", 0),
            token("noise", -1),
            token("   ", 95),
            token("", 80),
            token("  $125.00 ", 87),
        ]);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Total", "$125.00"]);
        assert_eq!(tokens[1].confidence, 87);
    }

    #[test]
    fn test_extract_preprocesses_and_keeps_order() {
        let recognizer = FixedRecognizer {
            tokens: vec![token("B", 50), token("", 90), token("A", 60)],
            seen_binary: Cell::new(false),
        };
        let extractor = TextExtractor::new(recognizer, "khm+eng");
        let region = DynamicImage::ImageLuma8(GrayImage::from_fn(8, 8, |x, _| {
            image::Luma([(x * 30) as u8])
        }));

        let tokens = extractor.extract(&region).unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["B", "A"]);
        assert!(extractor.recognizer.seen_binary.get());
        assert_eq!(extractor.engine_config(), "fixed -l khm+eng");
    }

    #[test]
    fn test_recognizer_failure_propagates() {
        let extractor = TextExtractor::new(BrokenRecognizer, "eng");
        let err = extractor
            .extract(&DynamicImage::new_luma8(4, 4))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Unavailable(_)));
    }
}
