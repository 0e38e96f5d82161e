//! Decoding encoded asset bytes into [`DecodedAudio`]

use std::io::Cursor;

use bytes::Bytes;
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::decoded::DecodedAudio;

/// Turns encoded bytes into playable audio
///
/// Decoding is CPU-bound; the cache runs it on tokio's blocking pool.
pub trait AudioDecoder: Send + Sync {
    /// Decode a whole asset
    ///
    /// `extension` is a format hint taken from the locator (e.g. `"mp3"`).
    fn decode(&self, bytes: Bytes, extension: Option<&str>) -> Result<DecodedAudio, String>;
}

/// Symphonia-backed decoder for MP3 and WAV assets
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: Bytes, extension: Option<&str>) -> Result<DecodedAudio, String> {
        if bytes.is_empty() {
            return Err("empty input".to_string());
        }

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let mss = MediaSourceStream::new(
            Box::new(Cursor::new(bytes)),
            MediaSourceStreamOptions::default(),
        );

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| format!("unrecognized audio format: {e}"))?;

        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| "no default audio track".to_string())?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        let mut decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| format!("unsupported codec: {e}"))?;

        let mut sample_rate = params.sample_rate.unwrap_or(0);
        let mut channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);
        let mut samples: Vec<f32> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(format!("failed to read packet: {e}")),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(audio_buf) => {
                    let spec = SignalSpec::new(audio_buf.spec().rate, audio_buf.spec().channels);
                    sample_rate = spec.rate;
                    channels = spec.channels.count() as u16;

                    let needs_realloc = sample_buf
                        .as_ref()
                        .is_none_or(|buf| buf.capacity() < audio_buf.capacity());
                    if needs_realloc {
                        sample_buf = Some(SampleBuffer::<f32>::new(
                            audio_buf.capacity() as u64,
                            spec,
                        ));
                    }

                    if let Some(buf) = sample_buf.as_mut() {
                        buf.copy_interleaved_ref(audio_buf);
                        samples.extend_from_slice(buf.samples());
                    }
                }
                // Corrupt frames are skipped, as players do
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(e) => return Err(format!("decode failed: {e}")),
            }
        }

        if samples.is_empty() || channels == 0 || sample_rate == 0 {
            return Err("no audio frames decoded".to_string());
        }

        Ok(DecodedAudio::new(samples, channels, sample_rate))
    }
}
