//! Subcommands and the setup they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod templates;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use formscan_core::models::config::OcrEngineKind;
use formscan_core::{DocumentProcessor, ScanConfig, TemplateStore, TextRecognizer, create_extractor};

/// OCR backend selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum EngineChoice {
    /// External tesseract binary
    Tesseract,
    /// Bundled ONNX models
    Onnx,
}

impl From<EngineChoice> for OcrEngineKind {
    fn from(choice: EngineChoice) -> Self {
        match choice {
            EngineChoice::Tesseract => OcrEngineKind::Tesseract,
            EngineChoice::Onnx => OcrEngineKind::Onnx,
        }
    }
}

/// Options shared by commands that run the pipeline.
#[derive(Args, Clone)]
pub struct RunArgs {
    /// Template to apply (default: config default_template)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Template definitions file (YAML)
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Root directory for run output
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// OCR engine
    #[arg(short, long, value_enum)]
    pub engine: Option<EngineChoice>,

    /// OCR languages, e.g. "khm+eng"
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Model directory for the ONNX engine
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Override configuration values with command-line options.
    pub fn apply(&self, config: &mut ScanConfig) {
        if let Some(path) = &self.templates {
            config.templates.path = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.root = dir.clone();
        }
        if let Some(engine) = self.engine {
            config.ocr.engine = engine.into();
        }
        if let Some(lang) = &self.lang {
            config.ocr.languages = lang.clone();
        }
        if let Some(dir) = &self.model_dir {
            config.ocr.model_dir = dir.clone();
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("formscan")
        .join("config.json")
}

/// Load configuration from `path`, the default location, or built-in defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<ScanConfig> {
    if let Some(path) = path {
        return ScanConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        return Ok(ScanConfig::from_file(&default_path)?);
    }

    Ok(ScanConfig::default())
}

/// Load templates and build a processor with the requested template selected.
pub fn build_processor(
    args: &RunArgs,
    config: &ScanConfig,
) -> anyhow::Result<DocumentProcessor<Box<dyn TextRecognizer>>> {
    let store = TemplateStore::load(&config.templates.path)?;

    let name = match args
        .template
        .clone()
        .or_else(|| config.templates.default_template.clone())
    {
        Some(name) => name,
        None if store.len() == 1 => store.names()[0].to_string(),
        None => anyhow::bail!(
            "No template given. Use --template with one of: {}",
            store.names().join(", ")
        ),
    };

    let extractor = create_extractor(&config.ocr)?;
    let mut processor =
        DocumentProcessor::new(store, extractor).with_output_root(&config.output.root);
    processor.set_template(&name)?;

    Ok(processor)
}
