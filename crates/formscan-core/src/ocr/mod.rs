//! OCR with preprocessing for template sections.

mod extractor;
mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;
mod recognizer;
mod tesseract;

pub use extractor::{TextExtractor, TextExtractorBuilder, filter_tokens};
pub use preprocessing::{ImagePreprocessor, binarize, otsu_threshold};
#[cfg(feature = "native")]
pub use pure_engine::PureOnnxRecognizer;
pub use recognizer::TextRecognizer;
pub use tesseract::{TesseractRecognizer, parse_tsv};

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::config::{OcrConfig, OcrEngineKind};

/// Create the recognizer selected by `config`.
pub fn create_recognizer(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, ExtractionError> {
    match config.engine {
        OcrEngineKind::Tesseract => {
            debug!("Using tesseract at {}", config.tesseract.binary.display());
            Ok(Box::new(TesseractRecognizer::new(config.tesseract.clone())))
        }
        #[cfg(feature = "native")]
        OcrEngineKind::Onnx => {
            debug!("Using ONNX models from {}", config.model_dir.display());
            Ok(Box::new(PureOnnxRecognizer::from_dir(&config.model_dir)?))
        }
        #[cfg(not(feature = "native"))]
        OcrEngineKind::Onnx => Err(ExtractionError::Unavailable(
            "ONNX engine requires the `native` feature".to_string(),
        )),
    }
}

/// Create a text extractor for `config`.
pub fn create_extractor(
    config: &OcrConfig,
) -> Result<TextExtractor<Box<dyn TextRecognizer>>, ExtractionError> {
    let recognizer = create_recognizer(config)?;
    Ok(TextExtractor::new(recognizer, config.languages.clone()))
}
