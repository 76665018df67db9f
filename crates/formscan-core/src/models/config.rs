//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FormscanError, Result};

/// Main configuration for formscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Template source configuration.
    pub templates: TemplateConfig,

    /// Output artifact configuration.
    pub output: OutputConfig,
}

/// Which OCR capability to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngineKind {
    /// External `tesseract` binary.
    Tesseract,
    /// Bundled ONNX models via `pure-onnx-ocr`.
    Onnx,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// OCR backend.
    pub engine: OcrEngineKind,

    /// Language/script mix, in Tesseract notation (e.g. "khm+eng").
    pub languages: String,

    /// Tesseract settings.
    pub tesseract: TesseractConfig,

    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::Tesseract,
            languages: "khm+eng".to_string(),
            tesseract: TesseractConfig::default(),
            model_dir: PathBuf::from("models"),
        }
    }
}

/// Settings for the Tesseract backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseractConfig {
    /// Path or name of the tesseract executable.
    pub binary: PathBuf,

    /// OCR engine mode (`--oem`).
    pub oem: u8,

    /// Page segmentation mode (`--psm`).
    pub psm: u8,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            oem: 3,
            psm: 6, // Single uniform block of text
        }
    }
}

/// Template source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// YAML file holding the template definitions.
    pub path: PathBuf,

    /// Template selected when none is given on the command line.
    pub default_template: Option<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("templates.yaml"),
            default_template: None,
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root under which each run gets its own directory.
    pub root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("output"),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FormscanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
