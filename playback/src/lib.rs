//! Skiffle playback - on-demand audio buffer cache
//!
//! Plays sound board assets by locator. The first play of a locator fetches
//! and decodes the asset; every later play replays the decoded buffer.
//!
//! # Architecture
//!
//! ```text
//! Trigger ──► Soundboard::trigger ──► PlaybackCache::play
//!                                         │
//!                    hit ◄────────────────┤ miss
//!                     │                   ▼
//!                     │        AssetFetcher::fetch (async)
//!                     │                   ▼
//!                     │        AudioDecoder::decode (blocking pool)
//!                     │                   ▼
//!                     │            insert DecodedAudio
//!                     ▼                   ▼
//!              PlaybackContext::play_decoded ──(ringbuf)──► cpal thread
//! ```
//!
//! - [`PlaybackContext`] - The session's audio output and decoder, or an
//!   explicit "unavailable" marker when the host has no output device
//! - [`PlaybackCache`] - Locator to decoded audio map with in-flight
//!   deduplication
//! - [`Soundboard`] - Fire-and-forget trigger surface that reports failures
//!   instead of propagating them

mod board;
mod cache;
mod context;
mod decode;
mod decoded;
mod error;
mod fetch;
mod locator;
mod mixer;
mod output;
mod settings;

#[cfg(test)]
pub(crate) mod test_utils;

pub use board::{PlaybackReport, Soundboard};
pub use cache::{EntryState, Playback, PlaybackCache};
pub use context::{Capability, OutputDevice, PlaybackContext};
pub use decode::{AudioDecoder, SymphoniaDecoder};
pub use decoded::DecodedAudio;
pub use error::{CapabilityAbsentError, DecodeError, FetchError, PlayError};
pub use fetch::{AssetFetcher, FetchFuture, LocatorFetcher};
pub use locator::Locator;
pub use mixer::{MAX_VOICES, Mixer, soft_clip};
pub use output::DeviceOutput;
pub use settings::PlaybackSettings;
