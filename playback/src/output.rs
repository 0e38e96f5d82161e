//! Audio output using cpal and a voice ring buffer
//!
//! The cpal stream lives on a dedicated `audio-out` thread (streams are not
//! `Send` on every platform). New voices reach the stream callback through a
//! lock-free ring buffer; the callback mixes them with [`Mixer`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use ringbuf::{
    HeapCons, HeapProd, HeapRb,
    traits::{Consumer, Producer, Split},
};
use tracing::{debug, error};

use crate::context::OutputDevice;
use crate::decoded::DecodedAudio;
use crate::mixer::{MAX_VOICES, Mixer};

/// Voices that may be queued between two stream callbacks
const VOICE_QUEUE_CAPACITY: usize = MAX_VOICES;

/// Scratch buffer preallocation (samples)
const SCRATCH_SAMPLES: usize = 4096;

/// Default output device of the host
pub struct DeviceOutput {
    /// Producer side of the voice queue (callback pops)
    voices: Mutex<HeapProd<DecodedAudio>>,
    /// Voices sounding as of the last callback
    active: Arc<AtomicUsize>,
    /// Voices queued but not yet picked up by the callback
    pending: Arc<AtomicUsize>,
    sample_rate: u32,
    /// Dropping the sender tells the audio thread to stop the stream
    shutdown: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl DeviceOutput {
    /// Open the host's default output device and start the stream
    pub fn open() -> Result<Self, String> {
        let ring = HeapRb::<DecodedAudio>::new(VOICE_QUEUE_CAPACITY);
        let (producer, consumer) = ring.split();

        let active = Arc::new(AtomicUsize::new(0));
        let pending = Arc::new(AtomicUsize::new(0));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread_active = Arc::clone(&active);
        let thread_pending = Arc::clone(&pending);
        let thread = thread::Builder::new()
            .name("audio-out".into())
            .spawn(move || {
                let (stream, sample_rate) =
                    match build_stream(consumer, thread_active, thread_pending) {
                        Ok(built) => built,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                let _ = ready_tx.send(Ok(sample_rate));

                // Blocks until the sender is dropped
                let _ = shutdown_rx.recv();
                drop(stream);
                debug!("Audio stream stopped");
            })
            .map_err(|e| format!("Failed to spawn audio thread: {}", e))?;

        let sample_rate = match ready_rx.recv() {
            Ok(Ok(rate)) => rate,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                return Err("Audio thread exited during startup".to_string());
            }
        };

        Ok(Self {
            voices: Mutex::new(producer),
            active,
            pending,
            sample_rate,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}

impl OutputDevice for DeviceOutput {
    fn start(&self, audio: DecodedAudio) -> Result<(), String> {
        let mut voices = self.voices.lock().unwrap_or_else(|e| {
            tracing::warn!("Voice queue mutex poisoned; continuing");
            e.into_inner()
        });
        voices
            .try_push(audio)
            .map_err(|_| "Voice queue full".to_string())?;
        self.pending.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn active_voices(&self) -> usize {
        self.active.load(Ordering::Acquire) + self.pending.load(Ordering::Acquire)
    }
}

impl Drop for DeviceOutput {
    fn drop(&mut self) {
        // Drop the sender first so the thread's recv() returns
        drop(self.shutdown.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Build and start the stream in the device's native sample format
fn build_stream(
    consumer: HeapCons<DecodedAudio>,
    active: Arc<AtomicUsize>,
    pending: Arc<AtomicUsize>,
) -> Result<(cpal::Stream, u32), String> {
    let host = cpal::default_host();

    let device = host
        .default_output_device()
        .ok_or_else(|| "No audio output device available".to_string())?;

    let config = device
        .default_output_config()
        .map_err(|e| format!("Failed to get default output config: {}", e))?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels();
    let mixer = Mixer::new(sample_rate, channels);
    let state = CallbackState {
        consumer,
        mixer,
        scratch: vec![0.0; SCRATCH_SAMPLES],
        active,
        pending,
    };

    let stream_config: cpal::StreamConfig = config.config();
    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_typed::<f32>(&device, &stream_config, state),
        cpal::SampleFormat::I16 => build_typed::<i16>(&device, &stream_config, state),
        cpal::SampleFormat::U16 => build_typed::<u16>(&device, &stream_config, state),
        other => Err(format!("Unsupported sample format: {:?}", other)),
    }?;

    stream
        .play()
        .map_err(|e| format!("Failed to play audio stream: {}", e))?;

    debug!("Audio stream started at {}Hz, {} channels", sample_rate, channels);

    Ok((stream, sample_rate))
}

/// Everything the stream callback owns
struct CallbackState {
    consumer: HeapCons<DecodedAudio>,
    mixer: Mixer,
    scratch: Vec<f32>,
    active: Arc<AtomicUsize>,
    pending: Arc<AtomicUsize>,
}

impl CallbackState {
    /// Pick up queued voices and mix `len` interleaved samples into scratch
    fn mix(&mut self, len: usize) -> &[f32] {
        while let Some(audio) = self.consumer.try_pop() {
            self.mixer.add(audio);
            self.pending.fetch_sub(1, Ordering::AcqRel);
        }

        if self.scratch.len() < len {
            self.scratch.resize(len, 0.0);
        }
        self.mixer.render(&mut self.scratch[..len]);
        self.active.store(self.mixer.active(), Ordering::Release);

        &self.scratch[..len]
    }
}

fn build_typed<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut state: CallbackState,
) -> Result<cpal::Stream, String>
where
    T: SizedSample + FromSample<f32>,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mixed = state.mix(data.len());
                for (out, &sample) in data.iter_mut().zip(mixed) {
                    *out = T::from_sample(sample);
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| format!("Failed to build audio stream: {}", e))
}
