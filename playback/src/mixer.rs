//! Voice mixing for the output device: resampling, channel mapping, and
//! soft clipping
//!
//! Every started sound becomes its own [`Voice`]; the mixer sums all active
//! voices into the output buffer and drops voices that have finished. At
//! most [`MAX_VOICES`] play at once, so mixing never allocates once the
//! mixer exists; a new voice beyond that replaces the one nearest its end.
//!
//! Sums above full scale go through a tanh soft limiter that saturates at
//! ±2.0 instead of hard clipping, so a dense burst of triggers distorts
//! gently rather than wrapping.

use crate::decoded::DecodedAudio;

/// Upper bound on simultaneously sounding voices
pub const MAX_VOICES: usize = 64;

/// One playing instance of a decoded sound
#[derive(Debug)]
struct Voice {
    audio: DecodedAudio,
    /// Playhead in source frames (fractional for resampling)
    position: f64,
    /// Source frames advanced per output frame
    step: f64,
}

impl Voice {
    fn new(audio: DecodedAudio, output_rate: u32) -> Self {
        let step = if output_rate == 0 {
            1.0
        } else {
            audio.sample_rate() as f64 / output_rate as f64
        };
        Self {
            audio,
            position: 0.0,
            step,
        }
    }

    fn finished(&self) -> bool {
        self.position >= self.audio.frames() as f64
    }

    /// Fraction of the sound already played
    fn progress(&self) -> f64 {
        self.position / self.audio.frames().max(1) as f64
    }

    /// Interpolated sample for `out_channel` at the current playhead
    #[inline]
    fn sample(&self, out_channel: usize, out_channels: usize) -> f32 {
        let src_channels = self.audio.channels() as usize;
        let frame = self.position as usize;
        let frac = (self.position - frame as f64) as f32;

        let read = |frame: usize| -> f32 {
            if out_channels == 1 && src_channels > 1 {
                // Downmix to mono by averaging
                let sum: f32 = (0..src_channels).map(|c| self.audio.sample(frame, c)).sum();
                sum / src_channels as f32
            } else {
                self.audio.sample(frame, out_channel)
            }
        };

        let s1 = read(frame);
        let s2 = if frame + 1 < self.audio.frames() {
            read(frame + 1)
        } else {
            s1
        };
        s1 + (s2 - s1) * frac
    }
}

/// Sums overlapping one-shot voices into interleaved output
#[derive(Debug)]
pub struct Mixer {
    voices: Vec<Voice>,
    sample_rate: u32,
    channels: usize,
}

impl Mixer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            voices: Vec::with_capacity(MAX_VOICES),
            sample_rate,
            channels: channels.max(1) as usize,
        }
    }

    /// Start a new voice at the beginning of `audio`
    ///
    /// When [`MAX_VOICES`] are already playing, the voice closest to
    /// finishing is replaced.
    pub fn add(&mut self, audio: DecodedAudio) {
        if audio.frames() == 0 {
            return;
        }
        let voice = Voice::new(audio, self.sample_rate);

        if self.voices.len() < MAX_VOICES {
            self.voices.push(voice);
            return;
        }

        let stolen = self
            .voices
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.progress().total_cmp(&b.progress()))
            .map(|(i, _)| i);
        if let Some(i) = stolen {
            self.voices[i] = voice;
        }
    }

    /// Voices still producing sound
    pub fn active(&self) -> usize {
        self.voices.len()
    }

    /// Fill `out` (interleaved, `channels` wide) with the mix of all voices
    ///
    /// Silence is written when nothing is playing. Finished voices are
    /// removed.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let channels = self.channels;

        for voice in &mut self.voices {
            for frame in out.chunks_exact_mut(channels) {
                if voice.finished() {
                    break;
                }
                for (ch, sample) in frame.iter_mut().enumerate() {
                    *sample += voice.sample(ch, channels);
                }
                voice.position += voice.step;
            }
        }

        self.voices.retain(|v| !v.finished());

        for sample in out.iter_mut() {
            *sample = soft_clip(*sample);
        }
    }
}

/// tanh(t) sampled at t = 0.0, 0.25, ..., 7.0
const TANH_LUT: [f32; 29] = [
    0.0, 0.244919, 0.462117, 0.635149, 0.761594, 0.848284, 0.905148, 0.941389, 0.964028,
    0.978034, 0.986614, 0.991815, 0.995055, 0.997109, 0.998396, 0.999198, 0.999665, 0.999892,
    0.999988, 0.999998, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
];

const TANH_STEPS_PER_UNIT: f32 = 4.0;

/// Linearly interpolated tanh for `t >= 0`, saturating at 1.0
#[inline]
fn tanh_approx(t: f32) -> f32 {
    let pos = (t * TANH_STEPS_PER_UNIT).min((TANH_LUT.len() - 1) as f32);
    let lo = (pos as usize).min(TANH_LUT.len() - 2);
    let frac = pos - lo as f32;
    TANH_LUT[lo] + (TANH_LUT[lo + 1] - TANH_LUT[lo]) * frac
}

/// Soft clipping for summed voices
///
/// Values in [-1, 1] pass through unchanged; larger magnitudes are
/// compressed toward ±2.0 as `sign(x) * (1 + tanh(|x| - 1))`.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    let magnitude = x.abs();
    if magnitude <= 1.0 {
        x
    } else {
        x.signum() * (1.0 + tanh_approx(magnitude - 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f32, frames: usize, channels: u16, rate: u32) -> DecodedAudio {
        DecodedAudio::new(vec![value; frames * channels as usize], channels, rate)
    }

    #[test]
    fn test_render_silence_when_idle() {
        let mut mixer = Mixer::new(44_100, 2);
        let mut out = vec![1.0; 64];
        mixer.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_mono_voice_fills_both_channels() {
        let mut mixer = Mixer::new(8_000, 2);
        mixer.add(constant(0.25, 4, 1, 8_000));

        let mut out = vec![0.0; 8];
        mixer.render(&mut out);
        assert!(out.iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_stereo_voice_downmixes_to_mono_output() {
        let audio = DecodedAudio::new(vec![0.2, 0.4, 0.2, 0.4], 2, 8_000);
        let mut mixer = Mixer::new(8_000, 1);
        mixer.add(audio);

        let mut out = vec![0.0; 2];
        mixer.render(&mut out);
        assert!((out[0] - 0.3).abs() < 1e-6);
        assert!((out[1] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_overlapping_voices_sum() {
        let mut mixer = Mixer::new(8_000, 1);
        let audio = constant(0.25, 16, 1, 8_000);
        mixer.add(audio.clone());
        mixer.add(audio);
        assert_eq!(mixer.active(), 2);

        let mut out = vec![0.0; 4];
        mixer.render(&mut out);
        assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_finished_voices_are_removed() {
        let mut mixer = Mixer::new(8_000, 1);
        mixer.add(constant(0.5, 3, 1, 8_000));

        let mut out = vec![0.0; 8];
        mixer.render(&mut out);
        assert_eq!(&out[..3], &[0.5, 0.5, 0.5]);
        assert!(out[3..].iter().all(|&s| s == 0.0));
        assert_eq!(mixer.active(), 0);
    }

    #[test]
    fn test_upsampling_stretches_voice() {
        // 22.05kHz source into 44.1kHz output plays each frame twice
        let mut mixer = Mixer::new(44_100, 1);
        mixer.add(constant(0.5, 10, 1, 22_050));

        let mut out = vec![0.0; 32];
        mixer.render(&mut out);
        let sounding = out.iter().filter(|&&s| s != 0.0).count();
        assert_eq!(sounding, 20);
    }

    #[test]
    fn test_empty_audio_is_ignored() {
        let mut mixer = Mixer::new(8_000, 2);
        mixer.add(DecodedAudio::new(Vec::<f32>::new(), 2, 8_000));
        assert_eq!(mixer.active(), 0);
    }

    #[test]
    fn test_voice_count_is_capped() {
        let mut mixer = Mixer::new(8_000, 1);
        for _ in 0..MAX_VOICES + 10 {
            mixer.add(constant(0.01, 100, 1, 8_000));
        }
        assert_eq!(mixer.active(), MAX_VOICES);
        assert_eq!(mixer.voices.capacity(), MAX_VOICES);
    }

    #[test]
    fn test_full_mixer_replaces_voice_nearest_its_end() {
        let mut mixer = Mixer::new(8_000, 1);
        mixer.add(constant(0.1, 10, 1, 8_000));
        for _ in 1..MAX_VOICES {
            mixer.add(constant(0.1, 1_000, 1, 8_000));
        }
        let mut out = vec![0.0; 5];
        mixer.render(&mut out);

        // The short voice is halfway done; it is the one that gets replaced
        mixer.add(constant(0.1, 7, 1, 8_000));

        assert_eq!(mixer.active(), MAX_VOICES);
        assert_eq!(mixer.voices[0].audio.frames(), 7);
        assert_eq!(mixer.voices[0].position, 0.0);
    }

    #[test]
    fn test_soft_clip_is_continuous_at_full_scale() {
        assert!((soft_clip(1.001) - 1.001).abs() < 1e-3);
        assert!((soft_clip(-1.001) + 1.001).abs() < 1e-3);
        assert!((soft_clip(100.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_soft_clip_passthrough() {
        assert_eq!(soft_clip(0.5), 0.5);
        assert_eq!(soft_clip(-1.0), -1.0);
    }

    #[test]
    fn test_soft_clip_limits() {
        let clipped = soft_clip(2.0);
        assert!(clipped > 1.0 && clipped < 2.0);
        let clipped_neg = soft_clip(-8.0);
        assert!(clipped_neg < -1.0 && clipped_neg >= -2.0);
    }
}
