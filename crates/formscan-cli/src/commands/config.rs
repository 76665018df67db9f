//! Config command - inspect and edit the JSON scan configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use formscan_core::ScanConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default settings
    Init(InitArgs),

    /// Print one setting, addressed by dotted key (e.g. "ocr.tesseract.psm")
    Get { key: String },

    /// Change one existing setting; the value is parsed as JSON, else taken as text
    Set { key: String, value: String },

    /// Print where the configuration file lives
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Write to this file instead of the configured location
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Template definitions file to record in the new config
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Default template to record in the new config
    #[arg(long)]
    template: Option<String>,

    /// Replace an existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let file = ConfigFile {
        path: config_path
            .map(PathBuf::from)
            .unwrap_or_else(default_config_path),
    };

    match args.command {
        ConfigCommand::Show => {
            if !file.exists() {
                eprintln!("{} {} not found, using defaults", style("ℹ").blue(), file);
            }
            println!("{}", serde_json::to_string_pretty(&file.load()?)?);
        }
        ConfigCommand::Init(init) => init_config(init, file)?,
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(file.load()?)?;
            let value = json
                .pointer(&pointer(&key))
                .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => set_config(&file, &key, &value)?,
        ConfigCommand::Path => {
            let status = if file.exists() {
                style("present").green()
            } else {
                style("missing, run 'formscan config init'").yellow()
            };
            println!("{} ({})", file, status);
        }
    }

    Ok(())
}

/// Configuration file location; absent files read as defaults.
struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> anyhow::Result<ScanConfig> {
        if self.exists() {
            Ok(ScanConfig::from_file(&self.path)?)
        } else {
            Ok(ScanConfig::default())
        }
    }

    fn store(&self, config: &ScanConfig) -> anyhow::Result<()> {
        write_config(&self.path, config)
    }
}

impl std::fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn write_config(path: &Path, config: &ScanConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

/// Dotted key to JSON pointer: "ocr.tesseract.psm" -> "/ocr/tesseract/psm".
fn pointer(key: &str) -> String {
    key.split('.')
        .map(|part| format!("/{}", part.replace('~', "~0").replace('/', "~1")))
        .collect()
}

fn init_config(args: InitArgs, file: ConfigFile) -> anyhow::Result<()> {
    let target = args.output.unwrap_or(file.path);
    if target.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            target.display()
        );
    }

    let mut config = ScanConfig::default();
    if let Some(templates) = args.templates {
        config.templates.path = templates;
    }
    config.templates.default_template = args.template;

    write_config(&target, &config)?;
    println!("{} Wrote {}", style("✓").green(), target.display());
    Ok(())
}

fn set_config(file: &ConfigFile, key: &str, raw: &str) -> anyhow::Result<()> {
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut json = serde_json::to_value(file.load()?)?;
    let slot = json
        .pointer_mut(&pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;
    *slot = value.clone();

    // Deserializing again rejects values of the wrong type
    let config: ScanConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    file.store(&config)?;

    println!("{} {} = {}", style("✓").green(), key, value);
    Ok(())
}
