//! Playback context: the session's audio output and decoder

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::decode::{AudioDecoder, SymphoniaDecoder};
use crate::decoded::DecodedAudio;
use crate::error::{CapabilityAbsentError, PlayError};
use crate::output::DeviceOutput;

/// An audio output that can start one-shot voices
///
/// Each `start` call is independent: voices never share mutable state and
/// overlap freely.
pub trait OutputDevice: Send + Sync {
    /// Start playing `audio` immediately
    fn start(&self, audio: DecodedAudio) -> Result<(), String>;

    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Voices still producing sound
    fn active_voices(&self) -> usize;
}

/// Whether the host provided an audio output
pub enum Capability {
    Available(Box<dyn OutputDevice>),
    Unavailable { reason: String },
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(output) => f
                .debug_struct("Available")
                .field("sample_rate", &output.sample_rate())
                .finish(),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// The single audio context of a playback session
///
/// Holds either a working output device or an explicit "unavailable"
/// marker. Every operation checks the marker first, so a host without
/// audio fails with [`CapabilityAbsentError`] instead of a device error.
pub struct PlaybackContext {
    capability: Capability,
    decoder: Arc<dyn AudioDecoder>,
}

impl PlaybackContext {
    /// Open the host's default output device
    ///
    /// Never fails: when no device can be opened the context is created in
    /// the unavailable state and a warning is logged.
    pub fn open() -> Self {
        Self::open_with(DeviceOutput::open)
    }

    /// Open an output with a custom constructor, falling back to unavailable
    pub fn open_with<D, F>(open: F) -> Self
    where
        D: OutputDevice + 'static,
        F: FnOnce() -> Result<D, String>,
    {
        match open() {
            Ok(output) => Self::new(output),
            Err(reason) => {
                warn!("Failed to open audio output: {}. Audio disabled.", reason);
                Self::unavailable(reason)
            }
        }
    }

    /// Context backed by an already opened output
    pub fn new(output: impl OutputDevice + 'static) -> Self {
        debug!("Playback context ready at {}Hz", output.sample_rate());
        Self {
            capability: Capability::Available(Box::new(output)),
            decoder: Arc::new(SymphoniaDecoder),
        }
    }

    /// Context for a host without audio output
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            capability: Capability::Unavailable {
                reason: reason.into(),
            },
            decoder: Arc::new(SymphoniaDecoder),
        }
    }

    /// Replace the decoder used for cache misses
    pub fn with_decoder(mut self, decoder: Arc<dyn AudioDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    pub fn is_available(&self) -> bool {
        matches!(self.capability, Capability::Available(_))
    }

    /// The output device, or the reason there is none
    pub fn output(&self) -> Result<&dyn OutputDevice, CapabilityAbsentError> {
        match &self.capability {
            Capability::Available(output) => Ok(output.as_ref()),
            Capability::Unavailable { reason } => Err(CapabilityAbsentError {
                reason: reason.clone(),
            }),
        }
    }

    pub fn decoder(&self) -> Arc<dyn AudioDecoder> {
        Arc::clone(&self.decoder)
    }

    /// Start a fresh one-shot voice for `audio`
    ///
    /// `locator` only labels errors.
    pub fn play_decoded(&self, locator: &str, audio: &DecodedAudio) -> Result<(), PlayError> {
        let output = self.output()?;
        output
            .start(audio.clone())
            .map_err(|reason| PlayError::Output {
                locator: locator.to_string(),
                reason,
            })
    }

    /// Voices still sounding (0 when unavailable)
    pub fn active_voices(&self) -> usize {
        self.output().map(|o| o.active_voices()).unwrap_or(0)
    }
}
