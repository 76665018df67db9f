//! Tesseract backend driven through the `tesseract` executable.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use image::GrayImage;
use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::models::config::TesseractConfig;
use crate::models::run::TextToken;

use super::recognizer::TextRecognizer;

/// Number of columns in Tesseract's TSV output.
const TSV_COLUMNS: usize = 12;

/// OCR via the `tesseract` command-line tool with TSV output.
pub struct TesseractRecognizer {
    config: TesseractConfig,
}

impl TesseractRecognizer {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    fn run(&self, path: &Path, languages: &str) -> Result<String, ExtractionError> {
        let output = Command::new(&self.config.binary)
            .arg(path)
            .arg("stdout")
            .arg("--oem")
            .arg(self.config.oem.to_string())
            .arg("--psm")
            .arg(self.config.psm.to_string())
            .arg("-l")
            .arg(languages)
            .arg("tsv")
            .output()
            .map_err(|e| {
                ExtractionError::Unavailable(format!(
                    "failed to run {} (is it installed?): {}",
                    self.config.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Recognition(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new(TesseractConfig::default())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "Tesseract"
    }

    fn describe(&self, languages: &str) -> String {
        format!(
            "--oem {} --psm {} -l {}",
            self.config.oem, self.config.psm, languages
        )
    }

    fn recognize(
        &self,
        image: &GrayImage,
        languages: &str,
    ) -> Result<Vec<TextToken>, ExtractionError> {
        let mut tmp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| ExtractionError::Preprocessing(format!("temp file: {}", e)))?;

        let mut encoded = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Png)
            .map_err(|e| ExtractionError::Preprocessing(format!("PNG encode: {}", e)))?;
        tmp.write_all(&encoded)
            .and_then(|_| tmp.flush())
            .map_err(|e| ExtractionError::Preprocessing(format!("temp file: {}", e)))?;

        let tsv = self.run(tmp.path(), languages)?;
        let tokens = parse_tsv(&tsv);
        debug!("tesseract returned {} rows", tokens.len());
        Ok(tokens)
    }
}

/// Parse Tesseract TSV output into raw tokens, one per row.
///
/// Rows keep their original text and confidence; structural rows carry a
/// confidence of -1 and empty text.
pub fn parse_tsv(tsv: &str) -> Vec<TextToken> {
    let mut tokens = Vec::new();

    for (idx, row) in tsv.lines().enumerate() {
        // Header row
        if idx == 0 && row.starts_with("level") {
            continue;
        }
        let cols: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
        if cols.len() < TSV_COLUMNS - 1 {
            trace!("Skipping short TSV row: {:?}", row);
            continue;
        }

        let int = |i: usize| cols[i].trim().parse::<i32>().unwrap_or(0);
        // Newer versions report fractional confidences
        let confidence = cols[10]
            .trim()
            .parse::<f64>()
            .map(|c| c.trunc() as i32)
            .unwrap_or(-1);

        tokens.push(TextToken {
            text: cols.get(11).copied().unwrap_or("").to_string(),
            x: int(6),
            y: int(7),
            width: int(8),
            height: int(9),
            confidence,
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t240\t60\t-1\t
5\t1\t1\t1\t1\t1\t12\t8\t40\t18\t96.512\tTotal
5\t1\t1\t1\t1\t2\t60\t8\t70\t18\t87.0\t$125.00
5\t1\t1\t1\t1\t3\t140\t8\t5\t18\t0\t  ";

    #[test]
    fn test_parse_tsv() {
        let tokens = parse_tsv(SAMPLE);
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].confidence, -1);
        assert_eq!(
            tokens[1],
            TextToken {
                text: "Total".to_string(),
                x: 12,
                y: 8,
                width: 40,
                height: 18,
                confidence: 96,
            }
        );
        assert_eq!(tokens[2].text, "$125.00");
        assert_eq!(tokens[2].confidence, 87);
        assert_eq!(tokens[3].text, "  ");
    }

    #[test]
    fn test_describe_matches_cli_flags() {
        let recognizer = TesseractRecognizer::default();
        assert_eq!(recognizer.describe("khm+eng"), "--oem 3 --psm 6 -l khm+eng");
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let recognizer = TesseractRecognizer::new(TesseractConfig {
            binary: "/nonexistent/tesseract".into(),
            ..TesseractConfig::default()
        });
        let err = recognizer
            .recognize(&GrayImage::new(4, 4), "eng")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Unavailable(_)));
    }
}
