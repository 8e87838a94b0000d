//! Spectral-subtraction noise suppression
//!
//! Estimates a stationary noise/music floor from the opening of the clip
//! and subtracts it from the full-signal magnitude spectrum. Best-effort
//! enhancement: any numerical failure falls back to the original waveform,
//! tagged `Bypassed`, and never fails the pipeline.

use rustfft::num_complex::Complex;
use tracing::{debug, warn};
use voxkit_common::params;

use crate::audio::AudioClip;
use crate::dsp::spectral;
use crate::error::{ProcessingError, ProcessingResult};
use crate::types::SuppressionOutcome;

/// Noise suppression configuration
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(default)]
pub struct SuppressorConfig {
    /// Over-subtraction strength applied to the noise spectrum
    pub oversubtraction: f32,
    /// Magnitude floor as a fraction of the original spectrum
    pub spectral_floor: f32,
    /// Longest prefix used for the noise profile, in seconds
    pub profile_max_secs: f32,
    /// Noise profile never exceeds this fraction of the clip
    pub profile_max_fraction: f32,
}

impl Default for SuppressorConfig {
    fn default() -> Self {
        Self {
            oversubtraction: params::NOISE_OVERSUBTRACTION,
            spectral_floor: params::NOISE_SPECTRAL_FLOOR,
            profile_max_secs: params::NOISE_PROFILE_MAX_SECS,
            profile_max_fraction: params::NOISE_PROFILE_MAX_FRACTION,
        }
    }
}

/// Noise suppression service
pub struct NoiseSuppressor {
    config: SuppressorConfig,
}

impl NoiseSuppressor {
    pub fn new(config: SuppressorConfig) -> Self {
        Self { config }
    }

    /// Create a suppressor from a full configuration, validating it
    pub fn with_config(config: SuppressorConfig) -> ProcessingResult<Self> {
        if config.oversubtraction <= 0.0 || !config.oversubtraction.is_finite() {
            return Err(ProcessingError::InvalidInput(
                "Over-subtraction strength must be positive".to_string(),
            ));
        }
        if !(config.spectral_floor > 0.0 && config.spectral_floor <= 1.0) {
            return Err(ProcessingError::InvalidInput(
                "Spectral floor must be in (0, 1]".to_string(),
            ));
        }
        if config.profile_max_secs <= 0.0 {
            return Err(ProcessingError::InvalidInput(
                "Noise profile length must be positive".to_string(),
            ));
        }
        if !(config.profile_max_fraction > 0.0 && config.profile_max_fraction <= 0.5) {
            return Err(ProcessingError::InvalidInput(
                "Noise profile fraction must be in (0, 0.5]".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Suppress the estimated noise floor of a clip
    ///
    /// The noise profile comes from the first min(profile_max_secs,
    /// duration * profile_max_fraction) of audio, assuming the recording
    /// opens with a feature-free prefix. Documented limitation: recordings
    /// that start mid-speech get part of the voice subtracted too.
    ///
    /// Returns the processed clip and whether subtraction was applied.
    pub fn suppress(&self, clip: &AudioClip) -> (AudioClip, SuppressionOutcome) {
        match self.spectral_subtraction(clip) {
            Some(samples) => {
                debug!(
                    samples = samples.len(),
                    "Noise suppression applied via spectral subtraction"
                );
                (
                    AudioClip::new(samples, clip.sample_rate),
                    SuppressionOutcome::Applied,
                )
            }
            None => {
                warn!("Noise suppression bypassed, returning original audio");
                (clip.clone(), SuppressionOutcome::Bypassed)
            }
        }
    }

    /// The subtraction itself; `None` means bypass
    fn spectral_subtraction(&self, clip: &AudioClip) -> Option<Vec<f32>> {
        let len = clip.samples.len();
        let profile_len = (clip.sample_rate as f32 * self.config.profile_max_secs)
            .min(len as f32 * self.config.profile_max_fraction) as usize;
        if profile_len == 0 {
            return None;
        }
        if clip.samples.iter().any(|s| !s.is_finite()) {
            return None;
        }

        // Magnitude spectrum of the noise prefix at its own transform
        // length, zero-extended (or truncated) to the full-signal length and
        // subtracted index-wise
        let noise_mags: Vec<f32> = spectral::forward_fft(&clip.samples[..profile_len])
            .iter()
            .map(|c| c.norm())
            .collect();

        let signal_fft = spectral::forward_fft(&clip.samples);

        // Subtract the scaled noise magnitude, floored at a fraction of the
        // original so no bin is driven to zero; phase is preserved
        let mut cleaned: Vec<Complex<f32>> = Vec::with_capacity(len);
        for (k, sig) in signal_fft.iter().enumerate() {
            let magnitude = sig.norm();
            let noise_magnitude = noise_mags.get(k).copied().unwrap_or(0.0);

            let subtracted = (magnitude - self.config.oversubtraction * noise_magnitude)
                .max(self.config.spectral_floor * magnitude);

            let ratio = if magnitude > 1e-10 {
                subtracted / magnitude
            } else {
                0.0
            };
            cleaned.push(sig * ratio);
        }

        let output = spectral::inverse_fft(&mut cleaned);
        if output.iter().any(|s| !s.is_finite()) {
            return None;
        }
        Some(output)
    }
}

impl Default for NoiseSuppressor {
    fn default() -> Self {
        Self::new(SuppressorConfig::default())
    }
}
