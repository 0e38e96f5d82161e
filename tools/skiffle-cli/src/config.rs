//! Configuration file (skiffle.toml)
//!
//! Looked up at `--config`, then `./skiffle.toml`, then the platform config
//! directory. A missing file means defaults; a file that exists but does
//! not parse is an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skiffle_catalog::CatalogSettings;
use skiffle_playback::PlaybackSettings;

pub const CONFIG_FILE: &str = "skiffle.toml";

/// Skiffle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Sound board page build
    #[serde(default)]
    pub catalog: CatalogSettings,
    /// Playback session
    #[serde(default)]
    pub playback: PlaybackSettings,
}

/// A configuration together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the configuration was read from, `None` for defaults
    pub source: Option<PathBuf>,
    /// Directory relative paths in the configuration resolve against
    pub base_dir: PathBuf,
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/skiffle`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "phetsims", "skiffle")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Load the configuration
///
/// An explicit path must exist. Otherwise the first existing default
/// location wins.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        return load_file(path);
    }

    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = config_dir() {
        candidates.push(dir.join(CONFIG_FILE));
    }
    load_first(&candidates)
}

/// Load the first of `candidates` that exists, or defaults
pub fn load_first(candidates: &[PathBuf]) -> Result<LoadedConfig> {
    match candidates.iter().find(|path| path.is_file()) {
        Some(path) => load_file(path),
        None => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            Ok(LoadedConfig {
                config: Config::default(),
                source: None,
                base_dir: PathBuf::from("."),
            })
        }
    }
}

fn load_file(path: &Path) -> Result<LoadedConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(LoadedConfig {
        config,
        source: Some(path.to_path_buf()),
        base_dir,
    })
}
