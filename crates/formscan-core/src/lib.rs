//! Core library for template-driven document OCR.
//!
//! This crate provides:
//! - Document templates with fractional section coordinates, loaded from YAML
//! - Region resolution from fractions to pixel boxes
//! - OCR with grayscale/Otsu preprocessing behind a pluggable recognizer
//! - A per-section pipeline that isolates failures and persists artifacts
//! - Markdown reports of each processing run

pub mod error;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod region;
pub mod report;
pub mod templates;

pub use error::{ExtractionError, FormscanError, RegionError, Result, TemplateError};
pub use models::config::ScanConfig;
pub use models::run::{ProcessingRun, SectionResult, SectionStatus, TextToken};
pub use models::template::{Rect, Section, Template};
pub use ocr::{TextExtractor, TextRecognizer, create_extractor, create_recognizer};
pub use pipeline::DocumentProcessor;
pub use region::{PixelBox, resolve};
pub use report::ReportGenerator;
pub use templates::TemplateStore;
