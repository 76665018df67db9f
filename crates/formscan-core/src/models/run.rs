//! Results of a single processing run.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::template::Rect;

/// One OCR-recognized word with its position, size and confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextToken {
    /// Recognized text.
    pub text: String,
    /// Left edge, in pixels of the section crop.
    pub x: i32,
    /// Top edge, in pixels of the section crop.
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Recognition confidence (0 - 100).
    pub confidence: i32,
}

/// Outcome of processing one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionStatus {
    /// Text was extracted (possibly none).
    Ok { tokens: Vec<TextToken> },
    /// Something scoped to this section went wrong.
    Failed { message: String },
}

/// Per-section result recorded by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    /// Name of the template section.
    pub section_name: String,
    /// Fractional region the section was cut from.
    pub coordinates: Rect,
    /// File name of the cropped image artifact, if it was written.
    pub image_file: Option<String>,
    #[serde(flatten)]
    pub status: SectionStatus,
}

impl SectionResult {
    /// Whether the section completed without error.
    pub fn is_ok(&self) -> bool {
        matches!(self.status, SectionStatus::Ok { .. })
    }

    /// Extracted tokens, if the section succeeded.
    pub fn tokens(&self) -> Option<&[TextToken]> {
        match &self.status {
            SectionStatus::Ok { tokens } => Some(tokens),
            SectionStatus::Failed { .. } => None,
        }
    }

    /// Failure message, if the section failed.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SectionStatus::Ok { .. } => None,
            SectionStatus::Failed { message } => Some(message),
        }
    }
}

/// One execution of the pipeline against one image and one template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRun {
    /// Path of the processed image.
    pub source_image_path: PathBuf,
    /// Key of the template used.
    pub template_name: String,
    /// Human-readable template name.
    pub template_display_name: String,
    /// Template description.
    pub template_description: String,
    /// When processing started.
    pub timestamp: DateTime<Local>,
    /// Directory holding every artifact of this run.
    pub output_directory: PathBuf,
    /// Name of the OCR engine.
    pub ocr_engine: String,
    /// OCR engine configuration string.
    pub ocr_config: String,
    /// Section results, in template order.
    pub results: Vec<SectionResult>,
}

impl ProcessingRun {
    /// Aggregate mapping of section name to token list or `{"error": message}`.
    ///
    /// Keys keep template order.
    pub fn aggregate(&self) -> Value {
        let mut map = Map::new();
        for result in &self.results {
            let value = match &result.status {
                SectionStatus::Ok { tokens } => json!(tokens),
                SectionStatus::Failed { message } => json!({ "error": message }),
            };
            map.insert(result.section_name.clone(), value);
        }
        Value::Object(map)
    }

    /// Look up the result for a section.
    pub fn result(&self, section_name: &str) -> Option<&SectionResult> {
        self.results.iter().find(|r| r.section_name == section_name)
    }

    /// Number of sections that completed without error.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// Number of sections that failed.
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// File name of the source image, for display.
    pub fn source_file_name(&self) -> String {
        self.source_image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_image_path.display().to_string())
    }
}
