//! Basic waveform cleanup
//!
//! Light conditioning applied before noise suppression when the processing
//! profile enables it: DC-offset removal, peak normalization, and
//! pre-emphasis. Infallible; an empty clip passes through unchanged.

use tracing::debug;
use voxkit_common::params;

use crate::audio::AudioClip;
use crate::error::{ProcessingError, ProcessingResult};
use crate::types::CleanupReport;

/// Cleanup stage configuration
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Absolute peak after normalization
    pub peak_target: f32,
    /// Pre-emphasis coefficient, y[n] = x[n] - coeff * x[n-1]
    pub preemphasis: f32,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            peak_target: params::CLEANUP_PEAK_TARGET,
            preemphasis: params::CLEANUP_PREEMPHASIS,
        }
    }
}

/// Waveform cleanup service
pub struct WaveformCleaner {
    config: CleanerConfig,
}

impl WaveformCleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Create a cleaner from a full configuration, validating it
    pub fn with_config(config: CleanerConfig) -> ProcessingResult<Self> {
        if !(config.peak_target > 0.0 && config.peak_target <= 1.0) {
            return Err(ProcessingError::InvalidInput(
                "Peak target must be in (0, 1]".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&config.preemphasis) {
            return Err(ProcessingError::InvalidInput(
                "Pre-emphasis coefficient must be in [0, 1)".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Clean a clip: remove DC offset, normalize the peak, pre-emphasize
    pub fn clean(&self, clip: &AudioClip) -> (AudioClip, CleanupReport) {
        let duration_seconds = clip.duration_seconds();
        if clip.is_empty() {
            let report = CleanupReport {
                duration_seconds,
                dc_offset_removed: 0.0,
                normalization_factor: 1.0,
                peak_before: 0.0,
                peak_after: 0.0,
            };
            return (clip.clone(), report);
        }

        let mut samples = clip.samples.clone();

        // DC offset
        let dc_offset =
            (samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64) as f32;
        for s in samples.iter_mut() {
            *s -= dc_offset;
        }

        // Peak normalization
        let peak_before = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        let normalization_factor = if peak_before > 0.0 {
            self.config.peak_target / peak_before
        } else {
            1.0
        };
        if normalization_factor != 1.0 {
            for s in samples.iter_mut() {
                *s *= normalization_factor;
            }
        }

        // Pre-emphasis, applied in place back to front so each sample still
        // sees its original predecessor
        let coeff = self.config.preemphasis;
        for i in (1..samples.len()).rev() {
            samples[i] -= coeff * samples[i - 1];
        }

        let peak_after = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));

        debug!(
            dc_offset,
            normalization_factor, peak_before, peak_after, "Waveform cleanup applied"
        );

        let report = CleanupReport {
            duration_seconds,
            dc_offset_removed: dc_offset,
            normalization_factor,
            peak_before,
            peak_after,
        };
        (AudioClip::new(samples, clip.sample_rate), report)
    }
}

impl Default for WaveformCleaner {
    fn default() -> Self {
        Self::new(CleanerConfig::default())
    }
}
