//! Audio test fixture generator
//!
//! Synthesizes WAV files with controllable voice-like characteristics:
//! a pitch-modulated tone with harmonics (so pitch tracking sees a moving
//! fundamental), optional silence gaps, and near-silence. Fixtures are
//! generated into temp directories, never checked in.

use std::path::{Path, PathBuf};

/// Configuration for generated voice-like audio
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    /// Peak amplitude of the synthesized voice
    pub amplitude: f32,
    /// Fundamental frequency in Hz
    pub base_pitch_hz: f32,
    /// Depth of the slow pitch sweep around the fundamental, Hz
    pub pitch_sweep_hz: f32,
    /// Feature-free opening before the voice starts
    pub leading_silence_seconds: f64,
    pub silence_gap_start: Option<f64>,
    pub silence_gap_duration: Option<f64>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 10.0,
            sample_rate: 22050,
            amplitude: 0.4,
            base_pitch_hz: 180.0,
            pitch_sweep_hz: 40.0,
            leading_silence_seconds: 0.0,
            silence_gap_start: None,
            silence_gap_duration: None,
        }
    }
}

/// Generate a voice-like WAV file
///
/// The signal is a frequency-modulated fundamental plus two harmonics with
/// a syllable-rate amplitude envelope, which gives the analyzer real pitch
/// observations and the segmenter real energy variation.
pub fn generate_voice_wav(path: &Path, config: &VoiceConfig) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let total_samples = (config.duration_seconds * config.sample_rate as f64) as usize;

    let (silence_start, silence_end) = if let (Some(start), Some(duration)) =
        (config.silence_gap_start, config.silence_gap_duration)
    {
        let start_sample = (start * config.sample_rate as f64) as usize;
        let end_sample = start_sample + (duration * config.sample_rate as f64) as usize;
        (start_sample, end_sample)
    } else {
        (total_samples + 1, total_samples + 2)
    };

    let leading_silence = (config.leading_silence_seconds * config.sample_rate as f64) as usize;

    // Integrate instantaneous frequency so the pitch sweep has no phase
    // discontinuities
    let mut phase = 0.0f64;
    for i in 0..total_samples {
        let silent = i < leading_silence || (i >= silence_start && i < silence_end);
        let value = if silent {
            0.0
        } else {
            let t = i as f64 / config.sample_rate as f64;
            let freq = config.base_pitch_hz as f64
                + config.pitch_sweep_hz as f64 * (2.0 * std::f64::consts::PI * 0.5 * t).sin();
            phase += 2.0 * std::f64::consts::PI * freq / config.sample_rate as f64;

            // Syllable-rate (4 Hz) amplitude envelope over a fundamental
            // plus two weak harmonics
            let envelope = 0.6 + 0.4 * (2.0 * std::f64::consts::PI * 4.0 * t).sin().abs();
            let voiced = phase.sin() + 0.3 * (2.0 * phase).sin() + 0.15 * (3.0 * phase).sin();
            (config.amplitude as f64 * envelope * voiced / 1.45) as f32
        };
        writer.write_sample((value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }

    writer.finalize()?;
    Ok(path.to_path_buf())
}

/// Generate a WAV file of digital silence
pub fn generate_silent_wav(
    path: &Path,
    duration_seconds: f64,
    sample_rate: u32,
) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let total_samples = (duration_seconds * sample_rate as f64) as usize;
    for _ in 0..total_samples {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(path.to_path_buf())
}

/// Generate a WAV file with a valid header and zero samples
pub fn generate_empty_wav(path: &Path, sample_rate: u32) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let writer = hound::WavWriter::create(path, spec)?;
    writer.finalize()?;
    Ok(path.to_path_buf())
}
