//! `[playback]` section of skiffle.toml

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Playback configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Open the audio output device (default: true). When false the session
    /// runs without audio capability.
    #[serde(default = "default_true")]
    pub audio: bool,
    /// Fetch timeout in milliseconds (default: 10000, 0 disables)
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Directory relative locators are read from (default: the directory of
    /// the generated page)
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Base URL relative locators are resolved against instead of `root`
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_true() -> bool {
    true
}
fn default_fetch_timeout_ms() -> u64 {
    10_000
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            audio: default_true(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            root: None,
            base_url: None,
        }
    }
}

impl PlaybackSettings {
    /// Fetch timeout, `None` when disabled
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }
}
