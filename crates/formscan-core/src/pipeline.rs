//! Document pipeline: crops every template section, extracts its text and
//! persists the artifacts of the run.
//!
//! Failures scoped to a single section (degenerate region, OCR failure, I/O
//! error writing that section's files) are recorded as
//! [`SectionStatus::Failed`] and never stop the remaining sections. Only
//! failures that prevent establishing the run (no template selected, image
//! unreadable, output directory not writable) abort the call.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::{debug, info, warn};

use crate::error::{FormscanError, Result};
use crate::models::run::{ProcessingRun, SectionResult, SectionStatus, TextToken};
use crate::models::template::{Section, Template};
use crate::ocr::{TextExtractor, TextRecognizer};
use crate::region;
use crate::report::ReportGenerator;
use crate::templates::TemplateStore;

/// Aggregate results file written to every run directory.
pub const AGGREGATE_FILE_NAME: &str = "final_results.json";

/// Run metadata file written to every run directory.
pub const RUN_FILE_NAME: &str = "run.json";

/// Processes documents against the active template.
pub struct DocumentProcessor<R: TextRecognizer> {
    store: TemplateStore,
    extractor: TextExtractor<R>,
    report: ReportGenerator,
    active: Option<Template>,
    output_root: PathBuf,
}

impl<R: TextRecognizer> DocumentProcessor<R> {
    /// Create a processor with no active template.
    pub fn new(store: TemplateStore, extractor: TextExtractor<R>) -> Self {
        Self {
            store,
            extractor,
            report: ReportGenerator::new(),
            active: None,
            output_root: PathBuf::from("output"),
        }
    }

    /// Set the directory under which run directories are created.
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Select the template used by [`process_document`](Self::process_document).
    ///
    /// On error the previous selection is kept.
    pub fn set_template(&mut self, name: &str) -> Result<()> {
        let template = self.store.lookup(name)?.clone();
        info!("Selected template: {}", name);
        self.active = Some(template);
        Ok(())
    }

    /// Currently selected template.
    pub fn active_template(&self) -> Option<&Template> {
        self.active.as_ref()
    }

    /// Loaded templates.
    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Process an image file with the active template.
    ///
    /// Artifacts go to `<output_root>/<image stem>_<YYYYmmdd_HHMMSS>/`, with a
    /// `_N` suffix when that directory already exists.
    pub fn process_document(&self, image_path: &Path) -> Result<ProcessingRun> {
        let template = self
            .active
            .as_ref()
            .ok_or(FormscanError::NoTemplateSelected)?;

        let image = image::open(image_path).map_err(|source| FormscanError::ImageLoad {
            path: image_path.to_path_buf(),
            source,
        })?;

        let timestamp = Local::now();
        let stem = image_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let base = format!("{}_{}", stem, timestamp.format("%Y%m%d_%H%M%S"));
        let output_dir = self.create_run_dir(&base)?;

        self.run(template, &image, image_path, &output_dir, timestamp)
    }

    /// Create a fresh run directory under the output root.
    fn create_run_dir(&self, base: &str) -> Result<PathBuf> {
        let output_dir_error = |path: &Path, source: std::io::Error| FormscanError::OutputDir {
            path: path.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(&self.output_root)
            .map_err(|source| output_dir_error(&self.output_root, source))?;

        let mut attempt = 0;
        loop {
            let dir = match attempt {
                0 => self.output_root.join(base),
                n => self.output_root.join(format!("{}_{}", base, n)),
            };
            match std::fs::create_dir(&dir) {
                Ok(()) => return Ok(dir),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("Run directory {} exists, trying next suffix", dir.display());
                    attempt += 1;
                }
                Err(source) => return Err(output_dir_error(&dir, source)),
            }
        }
    }

    /// Process an already decoded image with `template`, writing into `output_dir`.
    pub fn process(
        &self,
        template: &Template,
        image: &DynamicImage,
        source_image_path: &Path,
        output_dir: &Path,
    ) -> Result<ProcessingRun> {
        self.run(template, image, source_image_path, output_dir, Local::now())
    }

    fn run(
        &self,
        template: &Template,
        image: &DynamicImage,
        source_image_path: &Path,
        output_dir: &Path,
        timestamp: DateTime<Local>,
    ) -> Result<ProcessingRun> {
        let start = Instant::now();

        std::fs::create_dir_all(output_dir).map_err(|source| FormscanError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let (width, height) = image.dimensions();
        info!(
            "Processing {} ({}x{}) with template '{}' ({} sections)",
            source_image_path.display(),
            width,
            height,
            template.name,
            template.sections.len()
        );

        let results: Vec<SectionResult> = template
            .sections
            .iter()
            .enumerate()
            .map(|(idx, section)| self.process_section(idx + 1, section, image, output_dir))
            .collect();

        let run = ProcessingRun {
            source_image_path: source_image_path.to_path_buf(),
            template_name: template.name.clone(),
            template_display_name: template.display_name.clone(),
            template_description: template.description.clone(),
            timestamp,
            output_directory: output_dir.to_path_buf(),
            ocr_engine: self.extractor.engine_name().to_string(),
            ocr_config: self.extractor.engine_config(),
            results,
        };

        std::fs::write(
            output_dir.join(AGGREGATE_FILE_NAME),
            serde_json::to_string_pretty(&run.aggregate())?,
        )?;
        std::fs::write(
            output_dir.join(RUN_FILE_NAME),
            serde_json::to_string_pretty(&run)?,
        )?;
        self.report.write(&run)?;

        info!(
            "Run complete: {} of {} sections succeeded in {}ms, results in {}",
            run.succeeded(),
            run.results.len(),
            start.elapsed().as_millis(),
            output_dir.display()
        );

        Ok(run)
    }

    fn process_section(
        &self,
        index: usize,
        section: &Section,
        image: &DynamicImage,
        output_dir: &Path,
    ) -> SectionResult {
        let stem = artifact_stem(index, &section.name);
        let mut image_file = None;

        let status = match self.extract_section(section, image, output_dir, &stem, &mut image_file)
        {
            Ok(tokens) => SectionStatus::Ok { tokens },
            Err(e) => {
                warn!("Error processing {}: {}", section.name, e);
                SectionStatus::Failed {
                    message: e.to_string(),
                }
            }
        };

        SectionResult {
            section_name: section.name.clone(),
            coordinates: section.coordinates,
            image_file,
            status,
        }
    }

    fn extract_section(
        &self,
        section: &Section,
        image: &DynamicImage,
        output_dir: &Path,
        stem: &str,
        image_file: &mut Option<String>,
    ) -> Result<Vec<TextToken>> {
        let (width, height) = image.dimensions();
        let bbox = region::resolve(&section.coordinates, width, height)?;
        debug!(
            "Section '{}' -> ({},{})-({},{})",
            section.name, bbox.x1, bbox.y1, bbox.x2, bbox.y2
        );

        let cropped = region::crop(image, &bbox);
        let file_name = format!("{}.png", stem);
        cropped.save_with_format(output_dir.join(&file_name), ImageFormat::Png)?;
        *image_file = Some(file_name);

        let tokens = self.extractor.extract(&cropped)?;

        std::fs::write(
            output_dir.join(format!("{}.json", stem)),
            serde_json::to_string_pretty(&tokens)?,
        )?;

        debug!("Section '{}': {} tokens", section.name, tokens.len());
        Ok(tokens)
    }
}

/// Artifact file stem: 2-digit 1-based index and section name.
pub fn artifact_stem(index: usize, section_name: &str) -> String {
    format!("{:02}_{}", index, section_name)
}
