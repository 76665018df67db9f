//! Templates command - inspect the loaded document templates.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use formscan_core::TemplateStore;

use super::load_config;

/// Arguments for the templates command.
#[derive(Args)]
pub struct TemplatesArgs {
    /// Template definitions file (YAML)
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: TemplatesCommand,
}

#[derive(Subcommand)]
enum TemplatesCommand {
    /// List available templates
    List,

    /// Show the sections of a template
    Show {
        /// Template name
        name: String,
    },
}

pub async fn run(args: TemplatesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let path = args.templates.unwrap_or(config.templates.path);
    let store = TemplateStore::load(&path)?;

    match args.command {
        TemplatesCommand::List => list_templates(&store),
        TemplatesCommand::Show { name } => show_template(&store, &name),
    }
}

fn list_templates(store: &TemplateStore) -> anyhow::Result<()> {
    if store.is_empty() {
        println!("{} No templates defined.", style("ℹ").blue());
        return Ok(());
    }

    for template in store.iter() {
        println!(
            "{}  {} ({} sections)",
            style(&template.name).bold(),
            template.display_name,
            template.sections.len()
        );
    }

    Ok(())
}

fn show_template(store: &TemplateStore, name: &str) -> anyhow::Result<()> {
    let template = store.lookup(name)?;

    println!("{} ({})", style(&template.display_name).bold(), template.name);
    if !template.description.is_empty() {
        println!("{}", template.description);
    }
    println!();

    for (idx, section) in template.sections.iter().enumerate() {
        let c = &section.coordinates;
        println!(
            "{:02}  {:<24} x: {:.3}-{:.3}  y: {:.3}-{:.3}",
            idx + 1,
            section.name,
            c.x_start,
            c.x_end,
            c.y_start,
            c.y_end
        );
    }

    Ok(())
}
