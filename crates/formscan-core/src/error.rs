//! Error types for the formscan-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the formscan library.
#[derive(Error, Debug)]
pub enum FormscanError {
    /// Template configuration or lookup error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Region resolution error.
    #[error("region error: {0}")]
    Region(#[from] RegionError),

    /// Text extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// A document was submitted before any template was selected.
    #[error("no template selected, call set_template() first")]
    NoTemplateSelected,

    /// The input image could not be read or decoded.
    #[error("failed to load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The run output directory could not be created.
    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to loading and looking up templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The template source could not be read.
    #[error("failed to read template config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template source is not a valid document.
    #[error("failed to parse template config: {0}")]
    Parse(String),

    /// A template violates a structural rule.
    #[error("invalid template '{template}': {reason}")]
    Invalid { template: String, reason: String },

    /// No template with the requested name is loaded.
    #[error("template '{name}' not found. Available: {available}")]
    NotFound { name: String, available: String },
}

/// Errors related to converting fractional regions into pixel boxes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    /// A fractional coordinate is not a finite value in [0, 1].
    #[error("coordinate {field} = {value} is outside [0, 1]")]
    OutOfRange { field: &'static str, value: f64 },

    /// The resolved box has no area.
    #[error("degenerate region ({x1},{y1})-({x2},{y2}) for {width}x{height} image")]
    Degenerate {
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        width: u32,
        height: u32,
    },
}

/// Errors related to OCR text extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The OCR capability is missing or misconfigured.
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// The OCR capability ran but failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),
}

/// Result type for the formscan library.
pub type Result<T> = std::result::Result<T, FormscanError>;
