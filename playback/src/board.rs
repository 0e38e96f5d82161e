//! Soundboard trigger surface
//!
//! A trigger is fire-and-forget: it never blocks the caller and never
//! propagates a failure. Failures are logged and handed back in the
//! [`PlaybackReport`] for callers that want them.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{Playback, PlaybackCache};
use crate::error::PlayError;

/// Result of one trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    pub locator: String,
    pub outcome: Result<Playback, PlayError>,
}

impl PlaybackReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Cloneable handle that plays sound board entries
#[derive(Clone)]
pub struct Soundboard {
    cache: Arc<PlaybackCache>,
}

impl Soundboard {
    pub fn new(cache: Arc<PlaybackCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &PlaybackCache {
        &self.cache
    }

    /// Play `locator` in the background
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self, locator: impl Into<String>) -> JoinHandle<PlaybackReport> {
        let locator = locator.into();
        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            let outcome = cache.play(&locator).await;
            match &outcome {
                Ok(playback) => debug!("Playing {} ({:?})", locator, playback),
                Err(e) => warn!("unable to play file {}, error = {}", locator, e),
            }
            PlaybackReport { locator, outcome }
        })
    }
}
