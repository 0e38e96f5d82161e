//! Playback error taxonomy
//!
//! All errors are `Clone`: a single in-flight failure is handed to every
//! caller waiting on the same locator.

use std::time::Duration;

use thiserror::Error;

/// The host has no audio output capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("audio output unavailable: {reason}")]
pub struct CapabilityAbsentError {
    pub reason: String,
}

/// Retrieving the bytes behind a locator failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("failed to read {locator}: {reason}")]
    Io { locator: String, reason: String },
    #[error("request for {locator} failed: {reason}")]
    Http { locator: String, reason: String },
    #[error("request for {locator} returned HTTP {status}")]
    Status { locator: String, status: u16 },
    #[error("fetching {locator} timed out after {timeout:?}")]
    TimedOut { locator: String, timeout: Duration },
    #[error("invalid locator {locator}: {reason}")]
    InvalidLocator { locator: String, reason: String },
}

impl FetchError {
    /// Locator the failed fetch was for
    pub fn locator(&self) -> &str {
        match self {
            Self::Io { locator, .. }
            | Self::Http { locator, .. }
            | Self::Status { locator, .. }
            | Self::TimedOut { locator, .. }
            | Self::InvalidLocator { locator, .. } => locator,
        }
    }
}

/// Bytes were retrieved but are not decodable audio.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to decode {locator}: {reason}")]
pub struct DecodeError {
    pub locator: String,
    pub reason: String,
}

/// Outcome of a failed `play` call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    #[error(transparent)]
    CapabilityAbsent(#[from] CapabilityAbsentError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The output device refused to start a voice.
    #[error("audio output rejected {locator}: {reason}")]
    Output { locator: String, reason: String },
}

impl PlayError {
    pub fn is_capability_absent(&self) -> bool {
        matches!(self, Self::CapabilityAbsent(_))
    }
}
