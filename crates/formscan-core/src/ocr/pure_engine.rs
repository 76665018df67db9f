//! Pure Rust OCR backend using `pure-onnx-ocr`.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::run::TextToken;

use super::recognizer::TextRecognizer;

/// OCR backend using PaddleOCR ONNX models, no external runtime required.
pub struct PureOnnxRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl PureOnnxRecognizer {
    /// Create a recognizer from model files in a directory.
    ///
    /// Expects `det.onnx`, `rec.onnx` and `dict.txt`.
    pub fn from_dir(model_dir: &Path) -> Result<Self, ExtractionError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("rec.onnx");
        let dict_path = model_dir.join("dict.txt");

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(ExtractionError::Unavailable(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| ExtractionError::Unavailable(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine })
    }
}

impl TextRecognizer for PureOnnxRecognizer {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn describe(&self, _languages: &str) -> String {
        // Script support is fixed by the loaded dictionary
        "PaddleOCR det+rec (ONNX)".to_string()
    }

    fn recognize(
        &self,
        image: &GrayImage,
        _languages: &str,
    ) -> Result<Vec<TextToken>, ExtractionError> {
        let input = DynamicImage::ImageLuma8(image.clone()).to_rgb8();
        let results = self
            .engine
            .run_from_image(&DynamicImage::ImageRgb8(input))
            .map_err(|e| ExtractionError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        Ok(results
            .iter()
            .map(|r| {
                let (x, y, width, height) = polygon_to_rect(&r.bounding_box);
                TextToken {
                    text: r.text.replace("[UNK]", " "),
                    x,
                    y,
                    width,
                    height,
                    confidence: (r.confidence * 100.0).round() as i32,
                }
            })
            .collect())
    }
}

/// Convert a `Polygon<f64>` into an axis-aligned `(x, y, width, height)`.
fn polygon_to_rect(polygon: &pure_onnx_ocr::Polygon<f64>) -> (i32, i32, i32, i32) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for coord in polygon.exterior().coords() {
        min_x = min_x.min(coord.x);
        min_y = min_y.min(coord.y);
        max_x = max_x.max(coord.x);
        max_y = max_y.max(coord.y);
    }

    if !min_x.is_finite() || !min_y.is_finite() {
        return (0, 0, 0, 0);
    }

    (
        min_x as i32,
        min_y as i32,
        (max_x - min_x) as i32,
        (max_y - min_y) as i32,
    )
}
