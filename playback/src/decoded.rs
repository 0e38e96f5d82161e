//! Decoded, ready-to-play audio

use std::sync::Arc;
use std::time::Duration;

/// Immutable decoded sound
///
/// Interleaved `f32` samples in `[-1.0, 1.0]`. Cloning shares the sample
/// buffer, so the cache and any number of playing voices can hold the same
/// decode.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAudio {
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedAudio {
    /// Wrap interleaved samples
    ///
    /// A zero channel count is treated as mono.
    pub fn new(samples: impl Into<Arc<[f32]>>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            channels: channels.max(1),
            sample_rate,
        }
    }

    /// Interleaved sample data
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Sample at `frame` for `channel`, 0.0 when out of range
    #[inline]
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let channels = self.channels as usize;
        let channel = channel.min(channels - 1);
        self.samples
            .get(frame * channels + channel)
            .copied()
            .unwrap_or(0.0)
    }

    /// Whether two handles share the same decoded buffer
    pub fn shares_buffer(&self, other: &DecodedAudio) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_and_duration() {
        let audio = DecodedAudio::new(vec![0.0; 44_100 * 2], 2, 44_100);
        assert_eq!(audio.frames(), 44_100);
        assert_eq!(audio.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_channels_is_mono() {
        let audio = DecodedAudio::new(vec![0.5, 0.25], 0, 8_000);
        assert_eq!(audio.channels(), 1);
        assert_eq!(audio.frames(), 2);
    }

    #[test]
    fn test_sample_out_of_range_is_silent() {
        let audio = DecodedAudio::new(vec![0.1, 0.2, 0.3, 0.4], 2, 8_000);
        assert_eq!(audio.sample(1, 1), 0.4);
        assert_eq!(audio.sample(2, 0), 0.0);
        // Channels past the source clamp to the last one
        assert_eq!(audio.sample(0, 5), 0.2);
    }

    #[test]
    fn test_clone_shares_buffer() {
        let audio = DecodedAudio::new(vec![0.0; 4], 1, 8_000);
        let copy = audio.clone();
        assert!(audio.shares_buffer(&copy));

        let other = DecodedAudio::new(vec![0.0; 4], 1, 8_000);
        assert!(!audio.shares_buffer(&other));
    }
}
