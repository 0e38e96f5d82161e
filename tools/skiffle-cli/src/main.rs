//! Skiffle CLI - build and play the sound board
//!
//! # Commands
//!
//! - `skiffle build` - Scan project sounds and write the sound board page
//! - `skiffle play` - Play sound board entries through the audio output
//!
//! # Usage
//!
//! ```bash
//! # Regenerate html/sound-board.html from ../perennial/data/active-repos
//! skiffle build
//!
//! # Play two sounds, then replay them from the cache
//! skiffle play ../../alpha/sounds/click.wav ../../beta/sounds/ding.mp3 --repeat 2
//!
//! # Play everything the page would list
//! skiffle play --all
//! ```
//!
//! # Configuration (skiffle.toml)
//!
//! ```toml
//! [catalog]
//! project_list = "../perennial/data/active-repos"
//! projects_root = ".."
//! output = "html/sound-board.html"
//!
//! [playback]
//! audio = true
//! fetch_timeout_ms = 10000
//! ```

mod build;
mod config;
mod play;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Skiffle CLI - build and play the sound board
#[derive(Parser, Debug)]
#[command(name = "skiffle")]
#[command(about = "Build and play the Skiffle sound board")]
#[command(version)]
struct Cli {
    /// Configuration file (default: ./skiffle.toml, then the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan project sounds and write the sound board page
    Build(build::BuildArgs),

    /// Play sound board entries through the audio output
    Play(play::PlayArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let loaded = config::load(cli.config.as_deref())?;
    if let Some(source) = &loaded.source {
        tracing::info!("Using configuration from {}", source.display());
    }

    match cli.command {
        Commands::Build(args) => build::execute(args, loaded),
        Commands::Play(args) => play::execute(args, loaded),
    }
}
