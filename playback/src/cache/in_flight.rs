//! Ownership of one in-flight decode

use tokio::sync::watch;
use tracing::debug;

use super::{PlaybackCache, Slot};
use crate::decoded::DecodedAudio;
use crate::error::PlayError;
use crate::locator::Locator;

pub(super) type LoadOutcome = Result<DecodedAudio, PlayError>;

/// Held by the caller that is decoding a locator
///
/// Resolving it publishes the outcome to the map and to every waiter.
/// Dropping it unresolved (the owning future was cancelled) removes the
/// `Decoding` marker and closes the channel; waiters then claim the locator
/// again and one of them leads a fresh decode.
pub(super) struct InFlight<'a> {
    cache: &'a PlaybackCache,
    locator: Locator,
    tx: Option<watch::Sender<Option<LoadOutcome>>>,
}

impl<'a> InFlight<'a> {
    pub(super) fn new(
        cache: &'a PlaybackCache,
        locator: Locator,
        tx: watch::Sender<Option<LoadOutcome>>,
    ) -> Self {
        Self {
            cache,
            locator,
            tx: Some(tx),
        }
    }

    /// Store a successful decode (or forget a failed one) and wake waiters
    pub(super) fn finish(mut self, outcome: LoadOutcome) -> LoadOutcome {
        {
            let mut slots = self.cache.slots();
            match &outcome {
                Ok(audio) => {
                    slots.insert(self.locator.clone(), Slot::Present(audio.clone()));
                }
                Err(e) => {
                    debug!("Dropping failed decode of {}: {}", self.locator, e);
                    slots.remove(self.locator.as_str());
                }
            }
        }

        if let Some(tx) = self.tx.take() {
            tx.send_replace(Some(outcome.clone()));
        }
        outcome
    }

    /// Wait for another caller's in-flight decode
    ///
    /// `None` when that caller was dropped before publishing an outcome.
    pub(super) async fn wait(
        mut rx: watch::Receiver<Option<LoadOutcome>>,
    ) -> Option<LoadOutcome> {
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.tx.is_none() {
            return;
        }

        debug!("Decode of {} abandoned", self.locator);
        let mut slots = self.cache.slots();
        if matches!(slots.get(self.locator.as_str()), Some(Slot::Decoding(_))) {
            slots.remove(self.locator.as_str());
        }
        // The sender drops with `self`, closing the channel for waiters
    }
}
