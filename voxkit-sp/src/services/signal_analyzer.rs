//! Acoustic metric extraction
//!
//! Computes the full `AcousticMetrics` record for one waveform segment:
//! framed RMS energy, magnitude-filtered pitch observations, whole-segment
//! spectral descriptors, onset-based tempo, a coarse voice-type
//! classification, and a 13-coefficient MFCC summary. Empty or unanalyzable
//! input yields `AcousticMetrics::invalid()`, never an error.

use serde::Deserialize;
use tracing::debug;
use voxkit_common::params;

use crate::audio::AudioClip;
use crate::dsp::{mel, spectral, stats, tempo};
use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{AcousticMetrics, MfccSummary, VoiceType};

/// Rolloff threshold as a fraction of cumulative magnitude
const ROLLOFF_FRACTION: f32 = 0.85;

/// Mel filters feeding the MFCC summary
const N_MELS: usize = 40;

/// MFCC coefficients retained per frame
const N_MFCC: usize = 13;

/// Tempo search range in BPM
const TEMPO_MIN_BPM: f32 = 30.0;
const TEMPO_MAX_BPM: f32 = 300.0;

/// Analyzer configuration
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// RMS energy frame length in milliseconds
    pub frame_ms: f32,
    /// RMS energy hop length in milliseconds
    pub hop_ms: f32,
    /// FFT size for spectral frames
    pub n_fft: usize,
    /// Hop between spectral frames, in samples
    pub spectral_hop: usize,
    /// Lower bound of the pitch peak search band, Hz
    pub pitch_fmin_hz: f32,
    /// Upper bound of the pitch peak search band, Hz
    pub pitch_fmax_hz: f32,
    /// Magnitude percentile above which pitch observations are retained
    ///
    /// 50 keeps peaks above the median; the stricter analyzer variant
    /// uses 85.
    pub pitch_magnitude_percentile: f32,
    /// Median pitch below this classifies as male
    pub male_pitch_ceiling_hz: f32,
    /// Median pitch below this (above the male ceiling) classifies as female
    pub female_pitch_ceiling_hz: f32,
    /// Spectral contrast (dB) mapped to clarity 1.0
    pub clarity_full_scale_db: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            frame_ms: params::ENERGY_FRAME_MS,
            hop_ms: params::ENERGY_HOP_MS,
            n_fft: params::SPECTRAL_FRAME_LEN,
            spectral_hop: params::SPECTRAL_HOP_LEN,
            pitch_fmin_hz: params::PITCH_FMIN_HZ,
            pitch_fmax_hz: params::PITCH_FMAX_HZ,
            pitch_magnitude_percentile: params::PITCH_MAGNITUDE_PERCENTILE,
            male_pitch_ceiling_hz: params::MALE_PITCH_CEILING_HZ,
            female_pitch_ceiling_hz: params::FEMALE_PITCH_CEILING_HZ,
            clarity_full_scale_db: params::CLARITY_FULL_SCALE_DB,
        }
    }
}

/// Acoustic metric extraction service
pub struct SignalAnalyzer {
    config: AnalyzerConfig,
}

impl SignalAnalyzer {
    /// Create an analyzer with the default configuration
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
        }
    }

    /// Create an analyzer from a full configuration, validating it
    pub fn with_config(config: AnalyzerConfig) -> ProcessingResult<Self> {
        if !(0.0..100.0).contains(&config.pitch_magnitude_percentile) {
            return Err(ProcessingError::InvalidInput(
                "Pitch magnitude percentile must be in [0, 100)".to_string(),
            ));
        }
        if config.pitch_fmin_hz <= 0.0 || config.pitch_fmax_hz <= config.pitch_fmin_hz {
            return Err(ProcessingError::InvalidInput(
                "Pitch band must satisfy 0 < fmin < fmax".to_string(),
            ));
        }
        if config.n_fft == 0 || config.spectral_hop == 0 {
            return Err(ProcessingError::InvalidInput(
                "FFT size and hop must be positive".to_string(),
            ));
        }
        if config.frame_ms <= 0.0 || config.hop_ms <= 0.0 {
            return Err(ProcessingError::InvalidInput(
                "Frame and hop lengths must be positive".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Compute the acoustic metrics of one clip
    ///
    /// Empty input returns `AcousticMetrics::invalid()`; a clip with no
    /// retained pitch observations gets zeroed pitch fields and an
    /// `Unknown` voice type, which is a valid low-information result.
    pub fn analyze(&self, clip: &AudioClip) -> AcousticMetrics {
        if clip.is_empty() || clip.sample_rate == 0 {
            return AcousticMetrics::invalid();
        }

        let sample_rate = clip.sample_rate;
        let duration_seconds = clip.duration_seconds();

        // Short-term energy on the 25 ms / 10 ms speech grid
        let frame_len = ((self.config.frame_ms / 1000.0 * sample_rate as f32) as usize).max(1);
        let hop = ((self.config.hop_ms / 1000.0 * sample_rate as f32) as usize).max(1);
        let energies = stats::frame_rms(&clip.samples, frame_len, hop);

        let energy_min = stats::min(&energies);
        let energy_max = stats::max(&energies);

        // One spectrogram shared by the spectral descriptors, pitch
        // tracking, tempo, and MFCC paths
        let spec = spectral::stft(
            &clip.samples,
            self.config.n_fft,
            self.config.spectral_hop,
            sample_rate,
        );
        let freqs = spec.bin_frequencies();
        let bands = spectral::contrast_bands(spec.n_bins(), spec.n_fft, sample_rate);

        let mut centroids = Vec::with_capacity(spec.frames.len());
        let mut rolloffs = Vec::with_capacity(spec.frames.len());
        let mut bandwidths = Vec::with_capacity(spec.frames.len());
        let mut contrasts = Vec::with_capacity(spec.frames.len());
        let mut flatnesses = Vec::with_capacity(spec.frames.len());
        for mags in &spec.frames {
            let c = spectral::centroid(mags, &freqs);
            centroids.push(c);
            rolloffs.push(spectral::rolloff(mags, &freqs, ROLLOFF_FRACTION));
            bandwidths.push(spectral::bandwidth(mags, &freqs, c));
            contrasts.push(spectral::contrast(mags, &bands));
            flatnesses.push(spectral::flatness(mags));
        }

        // Pitch: every sinusoidal peak in the voice band, filtered down to
        // the observations whose magnitude exceeds the configured
        // percentile. This suppresses octave errors and silent-frame
        // artifacts.
        let peaks = spectral::pitch_peaks(&spec, self.config.pitch_fmin_hz, self.config.pitch_fmax_hz);
        let magnitudes: Vec<f32> = peaks.iter().map(|p| p.magnitude).collect();
        let magnitude_floor = stats::percentile(&magnitudes, self.config.pitch_magnitude_percentile);
        let retained: Vec<f32> = peaks
            .iter()
            .filter(|p| p.magnitude > magnitude_floor)
            .map(|p| p.hz)
            .collect();

        let (pitch_median, pitch_mean, pitch_std, pitch_min, pitch_max) = if retained.is_empty() {
            (0.0, 0.0, 0.0, 0.0, 0.0)
        } else {
            (
                stats::median(&retained),
                stats::mean(&retained),
                stats::std_dev(&retained),
                stats::percentile(&retained, 10.0),
                stats::percentile(&retained, 90.0),
            )
        };

        let voice_type = self.classify_voice(pitch_median, retained.len());

        // Tempo from the positive spectral-flux envelope
        let envelope = tempo::onset_strength(&spec);
        let tempo_bpm = tempo::estimate_bpm(&envelope, spec.frame_rate(), TEMPO_MIN_BPM, TEMPO_MAX_BPM);

        // MFCC voice-character summary
        let mfcc_frames = mel::mfcc_frames(&spec, N_MELS, N_MFCC);
        let mfcc = summarize_mfcc(&mfcc_frames, N_MFCC);

        let spectral_contrast_db = stats::mean(&contrasts);
        let spectral_flatness = stats::mean(&flatnesses).clamp(0.0, 1.0);

        debug!(
            duration_seconds,
            spectral_frames = spec.frames.len(),
            pitch_observations = retained.len(),
            pitch_median,
            voice_type = voice_type.as_str(),
            "Acoustic analysis complete"
        );

        AcousticMetrics {
            valid: true,
            duration_seconds,
            energy_mean: stats::mean(&energies),
            energy_std: stats::std_dev(&energies),
            energy_min,
            energy_max,
            energy_range: energy_max - energy_min,
            pitch_median_hz: pitch_median,
            pitch_mean_hz: pitch_mean,
            pitch_std_hz: pitch_std,
            pitch_min_hz: pitch_min,
            pitch_max_hz: pitch_max,
            pitch_observation_count: retained.len(),
            spectral_centroid_hz: stats::mean(&centroids),
            spectral_centroid_std_hz: stats::std_dev(&centroids),
            spectral_rolloff_hz: stats::mean(&rolloffs),
            spectral_bandwidth_hz: stats::mean(&bandwidths),
            spectral_contrast_db,
            spectral_flatness,
            clarity: (spectral_contrast_db / self.config.clarity_full_scale_db).clamp(0.0, 1.0),
            noise_level: spectral_flatness,
            tempo_bpm,
            speaking_rate: tempo_bpm / 60.0,
            voice_type,
            voice_type_confidence: voice_type.confidence(),
            mfcc,
        }
    }

    /// Coarse pitch-based classification; `Unknown` when nothing was retained
    fn classify_voice(&self, pitch_median: f32, observations: usize) -> VoiceType {
        if observations == 0 {
            VoiceType::Unknown
        } else if pitch_median < self.config.male_pitch_ceiling_hz {
            VoiceType::Male
        } else if pitch_median < self.config.female_pitch_ceiling_hz {
            VoiceType::Female
        } else {
            VoiceType::Child
        }
    }
}

impl Default for SignalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-coefficient mean and standard deviation over all MFCC frames
fn summarize_mfcc(frames: &[Vec<f32>], n_coeffs: usize) -> MfccSummary {
    if frames.is_empty() {
        return MfccSummary {
            mean: vec![0.0; n_coeffs],
            std: vec![0.0; n_coeffs],
        };
    }

    let mut mean = Vec::with_capacity(n_coeffs);
    let mut std = Vec::with_capacity(n_coeffs);
    for k in 0..n_coeffs {
        let column: Vec<f32> = frames.iter().map(|f| f[k]).collect();
        mean.push(stats::mean(&column));
        std.push(stats::std_dev(&column));
    }
    MfccSummary { mean, std }
}
