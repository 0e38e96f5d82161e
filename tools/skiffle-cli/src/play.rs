//! Play command - trigger sound board entries from the terminal
//!
//! Creates one playback context and one cache for the whole invocation, so
//! repeated locators replay the decoded buffer instead of fetching again.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Args;
use reqwest::Url;
use skiffle_catalog::CatalogBuilder;
use skiffle_playback::{
    LocatorFetcher, Playback, PlaybackCache, PlaybackContext, PlaybackReport, PlaybackSettings,
    Soundboard,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::config::LoadedConfig;

/// Grace period after the longest sound before giving up on the output
const DRAIN_GRACE: Duration = Duration::from_secs(2);
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Arguments for the play command
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Locators to play, as written in the generated page
    pub locators: Vec<String>,

    /// Play every asset of the scanned catalog
    #[arg(long)]
    pub all: bool,

    /// Number of rounds; later rounds replay cached audio
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    /// Also read locators from stdin, one per line
    #[arg(long)]
    pub stdin: bool,

    /// Run without an audio output (every play fails with "capability absent")
    #[arg(long)]
    pub no_audio: bool,

    /// Directory relative locators are read from (default: the page's directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Resolve relative locators against this URL instead of the filesystem
    #[arg(long)]
    pub base_url: Option<String>,

    /// Fetch timeout in milliseconds (0 disables)
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl PlayArgs {
    /// Apply command line overrides to the `[playback]` settings
    fn settings(&self, mut settings: PlaybackSettings) -> PlaybackSettings {
        if self.no_audio {
            settings.audio = false;
        }
        if let Some(root) = &self.root {
            settings.root = Some(root.clone());
        }
        if let Some(base_url) = &self.base_url {
            settings.base_url = Some(base_url.clone());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.fetch_timeout_ms = timeout_ms;
        }
        settings
    }
}

/// Outcome counts for one invocation
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PlaySummary {
    pub cached: usize,
    pub decoded: usize,
    pub joined: usize,
    pub failed: usize,
}

impl PlaySummary {
    pub fn record(&mut self, report: &PlaybackReport) {
        match report.outcome {
            Ok(Playback::Cached) => self.cached += 1,
            Ok(Playback::Decoded) => self.decoded += 1,
            Ok(Playback::Joined) => self.joined += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.played() + self.failed
    }

    pub fn played(&self) -> usize {
        self.cached + self.decoded + self.joined
    }
}

/// Execute the play command
pub fn execute(args: PlayArgs, loaded: LoadedConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run(args, loaded))
}

async fn run(args: PlayArgs, loaded: LoadedConfig) -> Result<()> {
    let catalog = CatalogBuilder::new(loaded.config.catalog.clone()).with_base_dir(&loaded.base_dir);
    let settings = args.settings(loaded.config.playback.clone());

    let mut locators = args.locators.clone();
    if args.stdin {
        locators.extend(read_stdin().await?);
    }
    if args.all {
        let scanned = catalog.catalog().context("Failed to scan sound catalog")?;
        locators.extend(scanned.triggers().map(|(_, locator)| locator.to_string()));
    }
    if locators.is_empty() {
        bail!("Nothing to play. Pass locators, --stdin or --all");
    }

    let board = open_board(&settings, &catalog)?;

    let mut summary = PlaySummary::default();
    for round in 0..args.repeat {
        debug!("Round {} of {}", round + 1, args.repeat);
        let pending: Vec<_> = locators.iter().map(|l| board.trigger(l.as_str())).collect();
        for handle in pending {
            let report = handle.await.context("Playback task panicked")?;
            summary.record(&report);
        }
    }

    drain(&board, &locators).await;

    println!(
        "Played {} of {} ({} decoded, {} cached, {} joined, {} failed)",
        summary.played(),
        summary.total(),
        summary.decoded,
        summary.cached,
        summary.joined,
        summary.failed
    );

    if summary.failed > 0 {
        bail!("{} of {} plays failed", summary.failed, summary.total());
    }
    Ok(())
}

fn open_board(settings: &PlaybackSettings, catalog: &CatalogBuilder) -> Result<Soundboard> {
    let context = if settings.audio {
        PlaybackContext::open()
    } else {
        PlaybackContext::unavailable("audio disabled by configuration")
    };

    // Relative locators are relative to the page, like in a browser
    let root = match &settings.root {
        Some(root) => root.clone(),
        None => catalog
            .output_path()
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let mut fetcher = LocatorFetcher::new(root);
    if let Some(base_url) = &settings.base_url {
        let url = Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;
        fetcher = fetcher.with_base_url(url);
    }
    info!("Serving relative locators from {}", describe_source(settings, &fetcher));

    let cache = PlaybackCache::new(Arc::new(context), Arc::new(fetcher))
        .with_fetch_timeout(settings.fetch_timeout());
    Ok(Soundboard::new(Arc::new(cache)))
}

fn describe_source(settings: &PlaybackSettings, fetcher: &LocatorFetcher) -> String {
    match &settings.base_url {
        Some(url) => url.clone(),
        None => fetcher.root().display().to_string(),
    }
}

async fn read_stdin() -> Result<Vec<String>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut locators = Vec::new();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if !line.is_empty() {
            locators.push(line.to_string());
        }
    }
    Ok(locators)
}

/// Wait until every started voice has finished, bounded by the longest sound
async fn drain(board: &Soundboard, locators: &[String]) {
    let cache = board.cache();
    let longest = locators
        .iter()
        .filter_map(|l| cache.get(l))
        .map(|audio| audio.duration())
        .max()
        .unwrap_or_default();
    let deadline = Instant::now() + longest + DRAIN_GRACE;

    while cache.context().active_voices() > 0 {
        if Instant::now() >= deadline {
            debug!("Output still busy after {:?}; exiting", longest + DRAIN_GRACE);
            break;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
