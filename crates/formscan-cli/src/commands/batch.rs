//! Batch processing command for multiple document images.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use super::{RunArgs, build_processor, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input glob pattern, e.g. "scans/*.jpg"
    #[arg(required = true)]
    input: String,

    #[command(flatten)]
    run: RunArgs,

    /// Also write summary.csv into the output root
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    output_directory: Option<PathBuf>,
    sections: usize,
    failed_sections: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.run.apply(&mut config);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(
                ext.to_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp"
            )
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let processor = build_processor(&args.run, &config)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = processor.process_document(&path);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(run) => results.push(FileResult {
                path,
                sections: run.results.len(),
                failed_sections: run.failed(),
                output_directory: Some(run.output_directory),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path,
                        output_directory: None,
                        sections: 0,
                        failed_sections: 0,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if args.summary {
        let summary_path = config.output.root.join("summary.csv");
        write_summary(&results, &summary_path)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed_files = results.iter().filter(|r| r.error.is_some()).count();
    let section_failures: usize = results.iter().map(|r| r.failed_sections).sum();

    println!();
    println!(
        "{} Processed {} files in {:.1}s ({} failed, {} failed sections)",
        if failed_files == 0 {
            style("✓").green()
        } else {
            style("!").yellow()
        },
        results.len(),
        start.elapsed().as_secs_f64(),
        failed_files,
        section_failures
    );

    Ok(())
}

fn write_summary(results: &[FileResult], path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "file",
        "output_directory",
        "sections",
        "failed_sections",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        wtr.write_record([
            result.path.display().to_string(),
            result
                .output_directory
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            result.sections.to_string(),
            result.failed_sections.to_string(),
            result.processing_time_ms.to_string(),
            result.error.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
