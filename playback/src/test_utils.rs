//! Shared test doubles for the playback crate

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use hashbrown::HashMap;

use crate::context::OutputDevice;
use crate::decode::{AudioDecoder, SymphoniaDecoder};
use crate::decoded::DecodedAudio;
use crate::error::FetchError;
use crate::fetch::{AssetFetcher, FetchFuture};
use crate::locator::Locator;

/// 16-bit PCM WAV file holding a quiet sawtooth
pub fn wav_bytes(channels: u16, sample_rate: u32, frames: usize) -> Bytes {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            let value = ((i % 100) as i16 - 50) * 100;
            for _ in 0..channels {
                writer.write_sample(value).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    Bytes::from(cursor.into_inner())
}

// ============================================================================
// Output
// ============================================================================

#[derive(Default)]
struct RecordingState {
    started: Vec<DecodedAudio>,
    reject: Option<String>,
}

/// Output device that records every voice it is asked to start
///
/// Voices never finish, so `active_voices()` equals the number of starts.
#[derive(Clone, Default)]
pub struct RecordingOutput {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output-start events so far
    pub fn starts(&self) -> usize {
        self.state.lock().unwrap().started.len()
    }

    pub fn started(&self) -> Vec<DecodedAudio> {
        self.state.lock().unwrap().started.clone()
    }

    /// Refuse every later start with `reason`
    pub fn reject_with(&self, reason: &str) {
        self.state.lock().unwrap().reject = Some(reason.to_string());
    }
}

impl OutputDevice for RecordingOutput {
    fn start(&self, audio: DecodedAudio) -> Result<(), String> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = &state.reject {
            return Err(reason.clone());
        }
        state.started.push(audio);
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn active_voices(&self) -> usize {
        self.starts()
    }
}

// ============================================================================
// Fetcher
// ============================================================================

/// Fetcher serving canned responses
///
/// Unknown locators fail with an I/O "not found" error. An optional delay
/// keeps fetches in flight long enough for concurrent callers to overlap.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    responses: Arc<Mutex<HashMap<String, Result<Bytes, FetchError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn serve(&self, locator: &str, bytes: Bytes) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(locator.to_string(), Ok(bytes));
        self
    }

    pub fn fail(&self, locator: &str, error: FetchError) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(locator.to_string(), Err(error));
        self
    }

    /// Number of fetches issued for `locator`
    pub fn calls_for(&self, locator: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.as_str() == locator)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl AssetFetcher for ScriptedFetcher {
    fn fetch<'a>(&'a self, locator: &'a Locator) -> FetchFuture<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(locator.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let response = self.responses.lock().unwrap().get(locator.as_str()).cloned();
            response.unwrap_or_else(|| {
                Err(FetchError::Io {
                    locator: locator.to_string(),
                    reason: "not found".to_string(),
                })
            })
        })
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// Symphonia decoder that counts how often it runs
#[derive(Clone, Default)]
pub struct CountingDecoder {
    decodes: Arc<AtomicUsize>,
}

impl CountingDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decodes(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }
}

impl AudioDecoder for CountingDecoder {
    fn decode(&self, bytes: Bytes, extension: Option<&str>) -> Result<DecodedAudio, String> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        SymphoniaDecoder.decode(bytes, extension)
    }
}
