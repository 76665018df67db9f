//! Process command - extract text from a single document image.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use formscan_core::{ProcessingRun, SectionStatus};

use super::{RunArgs, build_processor, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    run: RunArgs,

    /// Print only the aggregate results as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.run.apply(&mut config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("Loading templates...");

    let processor = build_processor(&args.run, &config)?;

    pb.set_message(format!(
        "Running OCR with template '{}'...",
        processor
            .active_template()
            .map(|t| t.display_name.as_str())
            .unwrap_or_default()
    ));

    let run = processor.process_document(&args.input);
    pb.finish_and_clear();
    let run = run?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.aggregate())?);
    } else {
        print_summary(&run);
        println!();
        println!("Extracted Text Data:");
        println!("{}", serde_json::to_string_pretty(&run.aggregate())?);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Print a per-section overview of a run.
pub fn print_summary(run: &ProcessingRun) {
    for result in &run.results {
        match &result.status {
            SectionStatus::Ok { tokens } => println!(
                "{} {} ({} tokens)",
                style("✓").green(),
                result.section_name,
                tokens.len()
            ),
            SectionStatus::Failed { message } => println!(
                "{} {}: {}",
                style("✗").red(),
                result.section_name,
                message
            ),
        }
    }

    println!(
        "{} Processing completed. Results saved to: {}",
        style("ℹ").blue(),
        run.output_directory.display()
    );
}
