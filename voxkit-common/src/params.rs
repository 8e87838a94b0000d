//! Tunable processing parameter defaults
//!
//! Every empirically-chosen constant in the pipeline lives here as a named
//! default, consumed by the per-component config structs in `voxkit-sp`.
//! None of these values has a first-principles derivation; they were tuned
//! against real recordings and remain candidates for recalibration. Override
//! them through the component configs, not by editing this file.

// ============================================================================
// Audio ingestion
// ============================================================================

/// Working sample rate all decoded audio is resampled to
///
/// Valid range: [8000, 48000] Hz
/// Default: 22050 Hz (the rate the synthesis collaborator consumes)
pub const TARGET_SAMPLE_RATE: u32 = 22_050;

// ============================================================================
// Short-term analysis framing
// ============================================================================

/// RMS energy analysis frame length
///
/// Valid range: [10.0, 100.0] ms
/// Default: 25.0 ms (standard short-term window for speech)
pub const ENERGY_FRAME_MS: f32 = 25.0;

/// RMS energy analysis hop length
///
/// Valid range: [5.0, 50.0] ms
/// Default: 10.0 ms
pub const ENERGY_HOP_MS: f32 = 10.0;

/// FFT size for spectral analysis frames
///
/// Valid range: [512, 8192] samples, power of two
/// Default: 2048 samples (~93 ms at 22.05 kHz)
pub const SPECTRAL_FRAME_LEN: usize = 2048;

/// Hop length between spectral analysis frames
///
/// Valid range: [128, 4096] samples
/// Default: 512 samples
pub const SPECTRAL_HOP_LEN: usize = 512;

// ============================================================================
// Noise suppression
// ============================================================================

/// Over-subtraction strength applied to the estimated noise spectrum
///
/// Valid range: [1.0, 3.0]
/// Default: 1.5 (stronger than 1.0 to catch noise-magnitude variance)
pub const NOISE_OVERSUBTRACTION: f32 = 1.5;

/// Magnitude floor as a fraction of the original spectrum
///
/// Valid range: (0.0, 1.0]
/// Default: 0.1 (prevents musical-noise artifacts from zeroed bins)
pub const NOISE_SPECTRAL_FLOOR: f32 = 0.1;

/// Longest prefix used to estimate the noise profile
///
/// Valid range: [0.25, 5.0] s
/// Default: 1.0 s
pub const NOISE_PROFILE_MAX_SECS: f32 = 1.0;

/// Noise profile never exceeds this fraction of the clip
///
/// Valid range: (0.0, 0.5]
/// Default: 0.25
pub const NOISE_PROFILE_MAX_FRACTION: f32 = 0.25;

// ============================================================================
// Voice activity segmentation
// ============================================================================

/// Adaptive energy threshold percentile (energy-only strategy)
///
/// Valid range: (0.0, 100.0)
/// Default: 30.0 (30th percentile of the clip's own energy distribution)
pub const VAD_ENERGY_PERCENTILE: f32 = 30.0;

/// Normalized voice-activity threshold (energy+centroid strategy)
///
/// Valid range: [0.0, 2.0] (z-score units)
/// Default: 0.5
pub const VAD_COMBINED_THRESHOLD: f32 = 0.5;

/// Minimum segment duration, light profile
///
/// Valid range: [1.0, 300.0] s
/// Default: 30.0 s (minimum usable reference length)
pub const MIN_SEGMENT_SECS_LIGHT: f32 = 30.0;

/// Minimum segment duration, strict profile
///
/// Valid range: [1.0, 300.0] s
/// Default: 60.0 s
pub const MIN_SEGMENT_SECS_STRICT: f32 = 60.0;

// ============================================================================
// Pitch tracking
// ============================================================================

/// Lower bound of the pitch peak search band
///
/// Valid range: [40.0, 150.0] Hz
/// Default: 65.0 Hz (must sit below the male classification cutoff)
pub const PITCH_FMIN_HZ: f32 = 65.0;

/// Upper bound of the pitch peak search band
///
/// Valid range: [500.0, 4000.0] Hz
/// Default: 2000.0 Hz
pub const PITCH_FMAX_HZ: f32 = 2000.0;

/// Magnitude percentile above which pitch observations are retained
///
/// Valid range: [0.0, 100.0)
/// Default: 50.0 (median; the server-side analyzer variant used 85.0)
pub const PITCH_MAGNITUDE_PERCENTILE: f32 = 50.0;

// ============================================================================
// Voice-type classification
// ============================================================================

/// Median pitch below this classifies as male
///
/// Valid range: [100.0, 200.0] Hz
/// Default: 150.0 Hz (coarse heuristic, not physiologically exact)
pub const MALE_PITCH_CEILING_HZ: f32 = 150.0;

/// Median pitch below this (and above the male ceiling) classifies as female
///
/// Valid range: [200.0, 300.0] Hz
/// Default: 250.0 Hz
pub const FEMALE_PITCH_CEILING_HZ: f32 = 250.0;

// ============================================================================
// Quality scoring
// ============================================================================

/// Duration at which the duration factor saturates
///
/// Valid range: [30.0, 300.0] s
/// Default: 60.0 s
pub const OPTIMAL_DURATION_SECS: f32 = 60.0;

/// Reference RMS energy the energy factor centers on
///
/// Valid range: (0.0, 1.0)
/// Default: 0.1 RMS
pub const OPTIMAL_ENERGY_RMS: f32 = 0.1;

/// Pitch standard deviation at which the stability factor reaches zero
///
/// Valid range: [10.0, 200.0] Hz
/// Default: 50.0 Hz
pub const PITCH_STABILITY_SPAN_HZ: f32 = 50.0;

/// Centroid standard deviation at which spectral consistency reaches zero
///
/// Valid range: [200.0, 5000.0] Hz
/// Default: 1000.0 Hz
pub const SPECTRAL_CONSISTENCY_SPAN_HZ: f32 = 1000.0;

/// Rating cut points (score ≥ cut)
///
/// Valid range: descending values in (0.0, 1.0)
/// Defaults: excellent 0.8, good 0.6, acceptable 0.4
pub const RATING_EXCELLENT: f32 = 0.8;
pub const RATING_GOOD: f32 = 0.6;
pub const RATING_ACCEPTABLE: f32 = 0.4;

/// Compatibility cut points for the recommendations block (score > cut)
///
/// Valid range: descending values in (0.0, 1.0)
/// Defaults: excellent 0.7, good 0.5, acceptable 0.3
pub const COMPAT_EXCELLENT: f32 = 0.7;
pub const COMPAT_GOOD: f32 = 0.5;
pub const COMPAT_ACCEPTABLE: f32 = 0.3;

/// Spectral contrast (dB) mapped to clarity 1.0
///
/// Valid range: [20.0, 60.0] dB
/// Default: 40.0 dB (typical clean speech lands near 0.4-0.75 clarity)
pub const CLARITY_FULL_SCALE_DB: f32 = 40.0;

// ============================================================================
// Validation gates
// ============================================================================

/// Minimum duration for a passing sample
///
/// Valid range: [10.0, 120.0] s
/// Default: 30.0 s
pub const VALIDATION_MIN_DURATION_SECS: f32 = 30.0;

/// Minimum pitch range (max - min) for a passing sample
///
/// Valid range: [10.0, 200.0] Hz
/// Default: 50.0 Hz (rejects monotone clips)
pub const VALIDATION_MIN_PITCH_RANGE_HZ: f32 = 50.0;

/// Minimum clarity for a passing sample
///
/// Valid range: [0.0, 1.0]
/// Default: 0.3
pub const VALIDATION_MIN_CLARITY: f32 = 0.3;

/// Maximum noise level for a passing sample
///
/// Valid range: [0.0, 1.0]
/// Default: 0.7
pub const VALIDATION_MAX_NOISE: f32 = 0.7;

// ============================================================================
// Improvement suggestions
// ============================================================================

/// Energy below this suggests the recording is too quiet
///
/// Valid range: (0.0, OPTIMAL_ENERGY_RMS)
/// Default: 0.05 RMS
pub const SUGGESTION_LOW_ENERGY: f32 = 0.05;

/// Energy above this suggests the recording is too loud
///
/// Valid range: (OPTIMAL_ENERGY_RMS, 1.0)
/// Default: 0.2 RMS
pub const SUGGESTION_HIGH_ENERGY: f32 = 0.2;

/// Pitch standard deviation above this suggests erratic delivery
///
/// Valid range: [50.0, 300.0] Hz
/// Default: 100.0 Hz
pub const SUGGESTION_HIGH_PITCH_STD: f32 = 100.0;

// ============================================================================
// Basic waveform cleanup
// ============================================================================

/// Peak amplitude after normalization
///
/// Valid range: (0.0, 1.0]
/// Default: 0.95 (headroom below full scale)
pub const CLEANUP_PEAK_TARGET: f32 = 0.95;

/// Pre-emphasis filter coefficient
///
/// Valid range: [0.9, 1.0)
/// Default: 0.97
pub const CLEANUP_PREEMPHASIS: f32 = 0.97;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_cuts_descend() {
        assert!(RATING_EXCELLENT > RATING_GOOD);
        assert!(RATING_GOOD > RATING_ACCEPTABLE);
        assert!(RATING_ACCEPTABLE > 0.0);
    }

    #[test]
    fn test_compat_cuts_descend() {
        assert!(COMPAT_EXCELLENT > COMPAT_GOOD);
        assert!(COMPAT_GOOD > COMPAT_ACCEPTABLE);
        assert!(COMPAT_ACCEPTABLE > 0.0);
    }

    #[test]
    fn test_pitch_band_brackets_classifier_cutoffs() {
        assert!(PITCH_FMIN_HZ < MALE_PITCH_CEILING_HZ);
        assert!(FEMALE_PITCH_CEILING_HZ < PITCH_FMAX_HZ);
    }

    #[test]
    fn test_suggestion_bounds_bracket_optimal_energy() {
        assert!(SUGGESTION_LOW_ENERGY < OPTIMAL_ENERGY_RMS);
        assert!(OPTIMAL_ENERGY_RMS < SUGGESTION_HIGH_ENERGY);
    }
}
