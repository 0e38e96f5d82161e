//! Playback cache: locator to decoded audio, filled on first play
//!
//! Each locator moves through `Absent -> Decoding -> Present`. A failed or
//! abandoned decode returns it to `Absent`, so the next play retries the
//! whole pipeline. `Present` is terminal for the session; nothing is ever
//! evicted.
//!
//! Concurrent plays of a locator that is already `Decoding` do not start a
//! second fetch: they wait for the in-flight decode and then each play once
//! (or each receive its error). If the call leading the decode is dropped,
//! the waiters start over and one of them takes the lead.

mod in_flight;


use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use hashbrown::HashMap;
use tokio::sync::watch;
use tracing::debug;

use crate::context::PlaybackContext;
use crate::decoded::DecodedAudio;
use crate::error::{DecodeError, FetchError, PlayError};
use crate::fetch::AssetFetcher;
use crate::locator::Locator;

use in_flight::{InFlight, LoadOutcome};

/// How a successful `play` obtained its audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Cache hit, played without suspending
    Cached,
    /// This call fetched and decoded the asset
    Decoded,
    /// Another call was already decoding it; this call waited for that decode
    Joined,
}

/// Cache state of one locator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Absent,
    Decoding,
    Present,
}

enum Slot {
    Decoding(watch::Receiver<Option<LoadOutcome>>),
    Present(DecodedAudio),
}

/// What a lookup decided, taken under the lock and acted on after it
enum Claim {
    Hit(DecodedAudio),
    Wait(watch::Receiver<Option<LoadOutcome>>),
    Lead(watch::Sender<Option<LoadOutcome>>),
}

/// Session-wide decoded audio cache
pub struct PlaybackCache {
    context: Arc<PlaybackContext>,
    fetcher: Arc<dyn AssetFetcher>,
    fetch_timeout: Option<Duration>,
    slots: Mutex<HashMap<Locator, Slot>>,
}

impl PlaybackCache {
    pub fn new(context: Arc<PlaybackContext>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            context,
            fetcher,
            fetch_timeout: None,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Abort fetches that take longer than `timeout`
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn context(&self) -> &PlaybackContext {
        &self.context
    }

    /// Play `locator`, decoding it first if it has not been decoded yet
    ///
    /// Exactly one voice is started per successful call. On failure nothing
    /// plays and nothing is cached.
    pub async fn play(&self, locator: &str) -> Result<Playback, PlayError> {
        self.context.output()?;

        loop {
            match self.claim(locator) {
                Claim::Hit(audio) => {
                    debug!("Cache hit for {}", locator);
                    self.context.play_decoded(locator, &audio)?;
                    return Ok(Playback::Cached);
                }
                Claim::Wait(rx) => {
                    debug!("Waiting for in-flight decode of {}", locator);
                    match InFlight::wait(rx).await {
                        Some(outcome) => {
                            let audio = outcome?;
                            self.context.play_decoded(locator, &audio)?;
                            return Ok(Playback::Joined);
                        }
                        // The leading call was dropped; claim again
                        None => continue,
                    }
                }
                Claim::Lead(tx) => {
                    let in_flight = InFlight::new(self, Locator::from(locator), tx);
                    let outcome = self.load(locator).await;
                    let audio = in_flight.finish(outcome)?;
                    self.context.play_decoded(locator, &audio)?;
                    return Ok(Playback::Decoded);
                }
            }
        }
    }

    /// Cache state of `locator`
    pub fn state(&self, locator: &str) -> EntryState {
        match self.slots().get(locator) {
            None => EntryState::Absent,
            Some(Slot::Decoding(_)) => EntryState::Decoding,
            Some(Slot::Present(_)) => EntryState::Present,
        }
    }

    /// Whether decoded audio is stored for `locator`
    pub fn contains(&self, locator: &str) -> bool {
        self.state(locator) == EntryState::Present
    }

    /// Decoded audio stored for `locator`
    pub fn get(&self, locator: &str) -> Option<DecodedAudio> {
        match self.slots().get(locator) {
            Some(Slot::Present(audio)) => Some(audio.clone()),
            _ => None,
        }
    }

    /// Number of decoded entries
    pub fn len(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| matches!(slot, Slot::Present(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `locator` and, on a miss, mark it as decoding by this caller
    fn claim(&self, locator: &str) -> Claim {
        let mut slots = self.slots();
        match slots.get(locator) {
            Some(Slot::Present(audio)) => Claim::Hit(audio.clone()),
            Some(Slot::Decoding(rx)) => Claim::Wait(rx.clone()),
            None => {
                let (tx, rx) = watch::channel(None);
                slots.insert(Locator::from(locator), Slot::Decoding(rx));
                Claim::Lead(tx)
            }
        }
    }

    /// Fetch then decode, without touching the map
    async fn load(&self, locator: &str) -> Result<DecodedAudio, PlayError> {
        let key = Locator::from(locator);

        let fetch = self.fetcher.fetch(&key);
        let bytes = match self.fetch_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fetch)
                .await
                .map_err(|_| FetchError::TimedOut {
                    locator: locator.to_string(),
                    timeout,
                })??,
            None => fetch.await?,
        };
        debug!("Fetched {} ({} bytes)", locator, bytes.len());

        let decoder = self.context.decoder();
        let extension = key.extension();
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(bytes, extension.as_deref()))
            .await
            .map_err(|e| DecodeError {
                locator: locator.to_string(),
                reason: format!("decoder task failed: {e}"),
            })?
            .map_err(|reason| DecodeError {
                locator: locator.to_string(),
                reason,
            })?;

        debug!(
            "Decoded {} ({} frames, {} channels, {}Hz)",
            locator,
            decoded.frames(),
            decoded.channels(),
            decoded.sample_rate()
        );
        Ok(decoded)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Locator, Slot>> {
        self.slots.lock().unwrap_or_else(|e| {
            tracing::warn!("Playback cache mutex poisoned; continuing");
            e.into_inner()
        })
    }
}
