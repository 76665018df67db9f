//! Markdown report for a processing run.

use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::models::run::{ProcessingRun, SectionResult, SectionStatus};

/// File name of the rendered report inside a run directory.
pub const REPORT_FILE_NAME: &str = "OCR_REPORT.md";

/// Renders a human-readable summary of a [`ProcessingRun`].
///
/// Only transcribes what the run recorded; nothing is recomputed.
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Render the report as Markdown.
    pub fn render(&self, run: &ProcessingRun) -> Result<String> {
        let mut output = String::new();

        output.push_str("# OCR Processing Report\n\n");
        output.push_str("## Document Information\n");
        output.push_str(&format!("- **Original File:** `{}`\n", run.source_file_name()));
        output.push_str(&format!("- **Template:** {}\n", run.template_display_name));
        output.push_str(&format!("- **Description:** {}\n", run.template_description));
        output.push_str(&format!(
            "- **Processing Date:** {}\n\n",
            run.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));

        output.push_str("## Processing Summary\n");
        output.push_str(&format!(
            "Total sections processed: {} ({} succeeded, {} failed)\n\n",
            run.results.len(),
            run.succeeded(),
            run.failed()
        ));

        output.push_str("## Detailed Results\n\n");
        for (idx, result) in run.results.iter().enumerate() {
            self.render_section(&mut output, idx + 1, result)?;
        }

        output.push_str("\n## Processing Notes\n");
        output.push_str(&format!("- OCR Engine: {}\n", run.ocr_engine));
        output.push_str(&format!("- Configuration: `{}`\n", run.ocr_config));
        output.push_str(&format!(
            "- Output Directory: `{}`\n",
            run.output_directory.display()
        ));

        Ok(output)
    }

    fn render_section(
        &self,
        output: &mut String,
        number: usize,
        result: &SectionResult,
    ) -> Result<()> {
        output.push_str(&format!(
            "### {}. {}\n\n",
            number,
            title_case(&result.section_name)
        ));

        output.push_str("#### Coordinates\n");
        output.push_str("```yaml\n");
        output.push_str(&serde_yaml::to_string(&result.coordinates)?);
        output.push_str("```\n\n");

        output.push_str("#### Processed Image\n");
        match &result.image_file {
            Some(file) => output.push_str(&format!("![{}]({})\n\n", result.section_name, file)),
            None => output.push_str("*Image not available*\n\n"),
        }

        output.push_str("#### Extracted Text\n");
        match &result.status {
            SectionStatus::Ok { tokens } if tokens.is_empty() => {
                output.push_str("*No text extracted from this section*\n\n");
            }
            SectionStatus::Ok { tokens } => {
                output.push_str("```json\n");
                output.push_str(&serde_json::to_string_pretty(tokens)?);
                output.push_str("\n```\n\n");
            }
            SectionStatus::Failed { message } => {
                output.push_str(&format!("**Failed:** {}\n\n", message));
            }
        }

        output.push_str("---\n\n");
        Ok(())
    }

    /// Render the report into the run's output directory.
    pub fn write(&self, run: &ProcessingRun) -> Result<PathBuf> {
        let path = run.output_directory.join(REPORT_FILE_NAME);
        std::fs::write(&path, self.render(run)?)?;
        info!("Report generated: {}", path.display());
        Ok(path)
    }
}

/// "invoice_number" -> "Invoice Number".
fn title_case(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::run::TextToken;
    use crate::models::template::Rect;
    use chrono::{Local, TimeZone};
    use std::path::PathBuf;

    fn sample_run() -> ProcessingRun {
        ProcessingRun {
            source_image_path: PathBuf::from("/scans/gg.jpg"),
            template_name: "tax_invoice".to_string(),
            template_display_name: "Tax Invoice".to_string(),
            template_description: "VAT invoice layout".to_string(),
            timestamp: Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
            output_directory: PathBuf::from("output/gg_20240305_140709"),
            ocr_engine: "Tesseract".to_string(),
            ocr_config: "--oem 3 --psm 6 -l khm+eng".to_string(),
            results: vec![
                SectionResult {
                    section_name: "invoice_number".to_string(),
                    coordinates: Rect::new(0.6, 0.9, 0.1, 0.2),
                    image_file: Some("01_invoice_number.png".to_string()),
                    status: SectionStatus::Ok {
                        tokens: vec![TextToken {
                            text: "INV-0042".to_string(),
                            x: 3,
                            y: 4,
                            width: 80,
                            height: 20,
                            confidence: 91,
                        }],
                    },
                },
                SectionResult {
                    section_name: "notes".to_string(),
                    coordinates: Rect::new(0.0, 1.0, 0.8, 0.9),
                    image_file: Some("02_notes.png".to_string()),
                    status: SectionStatus::Ok { tokens: Vec::new() },
                },
                SectionResult {
                    section_name: "stamp".to_string(),
                    coordinates: Rect::new(0.5, 0.5, 0.0, 0.1),
                    image_file: None,
                    status: SectionStatus::Failed {
                        message: "degenerate region".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("invoice_number"), "Invoice Number");
        assert_eq!(title_case("TOTAL_due"), "Total Due");
        assert_eq!(title_case("amount"), "Amount");
    }

    #[test]
    fn test_render_layout() {
        let report = ReportGenerator::new().render(&sample_run()).unwrap();

        let header = report.find("- **Original File:** `gg.jpg`").unwrap();
        let summary = report
            .find("Total sections processed: 3 (2 succeeded, 1 failed)")
            .unwrap();
        let first = report.find("### 1. Invoice Number").unwrap();
        let second = report.find("### 2. Notes").unwrap();
        let third = report.find("### 3. Stamp").unwrap();
        let footer = report.find("## Processing Notes").unwrap();
        assert!(header < summary && summary < first);
        assert!(first < second && second < third && third < footer);

        assert!(report.contains("- **Template:** Tax Invoice"));
        assert!(report.contains("- **Processing Date:** 2024-03-05 14:07:09"));
        assert!(report.contains("x_start: 0.6\nx_end: 0.9\ny_start: 0.1\ny_end: 0.2\n"));
        assert!(report.contains("![invoice_number](01_invoice_number.png)"));
        assert!(report.contains("\"text\": \"INV-0042\""));
        assert!(report.contains("- Configuration: `--oem 3 --psm 6 -l khm+eng`"));
        assert!(report.contains("- Output Directory: `output/gg_20240305_140709`"));
    }

    #[test]
    fn test_render_marks_empty_and_failed_sections() {
        let report = ReportGenerator::new().render(&sample_run()).unwrap();

        let notes = &report[report.find("### 2. Notes").unwrap()..report.find("### 3.").unwrap()];
        assert!(notes.contains("*No text extracted from this section*"));

        let stamp = &report[report.find("### 3. Stamp").unwrap()..];
        assert!(stamp.contains("*Image not available*"));
        assert!(stamp.contains("**Failed:** degenerate region"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut run = sample_run();
        run.output_directory = dir.path().to_path_buf();

        let path = ReportGenerator::new().write(&run).unwrap();
        assert_eq!(path, dir.path().join(REPORT_FILE_NAME));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("# OCR Processing Report"));
    }
}
