//! Build command - scan project sounds and write the sound board page

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skiffle_catalog::CatalogBuilder;

use crate::config::LoadedConfig;

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Output page (overrides `catalog.output`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Handlebars template (overrides `catalog.template`)
    #[arg(short, long)]
    pub template: Option<PathBuf>,
}

/// Execute the build command
pub fn execute(args: BuildArgs, loaded: LoadedConfig) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    // Paths given on the command line are relative to the working directory
    let mut settings = loaded.config.catalog;
    if let Some(output) = args.output {
        settings.output = cwd.join(output);
    }
    if let Some(template) = args.template {
        settings.template = Some(cwd.join(template));
    }

    let report = CatalogBuilder::new(settings)
        .with_base_dir(loaded.base_dir)
        .build()
        .context("Failed to build sound board")?;

    println!(
        "Built {} ({} sounds from {} projects)",
        report.output.display(),
        report.sounds,
        report.projects
    );
    Ok(())
}
