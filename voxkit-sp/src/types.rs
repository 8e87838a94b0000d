//! Core value objects for voice sample processing
//!
//! Everything here is an immutable record produced by one pipeline stage and
//! consumed by later stages, persisted reports, or the registry. All types
//! are serde-serializable so run reports and segment sidecars can be written
//! as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

// ============================================================================
// Voice classification
// ============================================================================

/// Coarse voice-type classification derived from median pitch
///
/// Heuristic cutoffs (150/250 Hz), not physiologically exact. Callers must
/// not treat this as ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceType {
    Male,
    Female,
    Child,
    /// No valid pitch observations were available
    Unknown,
}

impl VoiceType {
    /// Fixed confidence attached to each classification
    pub fn confidence(&self) -> f32 {
        match self {
            VoiceType::Male => 0.8,
            VoiceType::Female => 0.7,
            VoiceType::Child => 0.6,
            VoiceType::Unknown => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceType::Male => "male",
            VoiceType::Female => "female",
            VoiceType::Child => "child",
            VoiceType::Unknown => "unknown",
        }
    }
}

// ============================================================================
// Acoustic metrics
// ============================================================================

/// Per-coefficient MFCC summary over all analysis frames
///
/// Raw per-frame coefficients are not retained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MfccSummary {
    /// Mean of each of the 13 coefficients
    pub mean: Vec<f32>,
    /// Standard deviation of each of the 13 coefficients
    pub std: Vec<f32>,
}

/// Low-level acoustic features of one waveform segment
///
/// Computed once per candidate segment during pipeline execution, never
/// mutated afterward. `valid == false` means the input was empty or
/// unanalyzable and every numeric field is zero; downstream scoring treats
/// that as a zero-quality segment rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcousticMetrics {
    /// False when the waveform was empty/unanalyzable (all fields zero)
    pub valid: bool,
    /// Segment duration in seconds
    pub duration_seconds: f32,

    /// Mean of framed RMS energy (25 ms frames, 10 ms hop)
    pub energy_mean: f32,
    /// Standard deviation of framed RMS energy
    pub energy_std: f32,
    /// Minimum framed RMS energy
    pub energy_min: f32,
    /// Maximum framed RMS energy
    pub energy_max: f32,
    /// energy_max - energy_min
    pub energy_range: f32,

    /// Median of retained pitch observations (Hz)
    pub pitch_median_hz: f32,
    /// Mean of retained pitch observations (Hz)
    pub pitch_mean_hz: f32,
    /// Standard deviation of retained pitch observations (Hz)
    pub pitch_std_hz: f32,
    /// 10th percentile of retained pitch observations (robust floor, Hz)
    pub pitch_min_hz: f32,
    /// 90th percentile of retained pitch observations (robust ceiling, Hz)
    pub pitch_max_hz: f32,
    /// Number of pitch observations surviving the magnitude filter
    pub pitch_observation_count: usize,

    /// Mean spectral centroid (Hz)
    pub spectral_centroid_hz: f32,
    /// Standard deviation of spectral centroid across frames (Hz)
    pub spectral_centroid_std_hz: f32,
    /// Mean spectral rolloff at 85% cumulative energy (Hz)
    pub spectral_rolloff_hz: f32,
    /// Mean spectral bandwidth (Hz)
    pub spectral_bandwidth_hz: f32,
    /// Mean spectral contrast across octave bands (dB)
    pub spectral_contrast_db: f32,
    /// Mean spectral flatness, 0 = tonal, 1 = noise-like
    pub spectral_flatness: f32,

    /// Contrast-derived clarity score in [0, 1]
    pub clarity: f32,
    /// Flatness-derived noise level in [0, 1]
    pub noise_level: f32,

    /// Onset-autocorrelation tempo estimate (BPM-like scalar, 0 if degenerate)
    pub tempo_bpm: f32,
    /// tempo_bpm / 60
    pub speaking_rate: f32,

    /// Coarse classification from median pitch
    pub voice_type: VoiceType,
    /// Fixed confidence for the classification
    pub voice_type_confidence: f32,

    /// 13-coefficient MFCC summary
    pub mfcc: MfccSummary,
}

impl AcousticMetrics {
    /// All-zero metrics with the validity flag cleared
    ///
    /// Returned for empty/unanalyzable input so the pipeline can score the
    /// segment as a reject instead of failing.
    pub fn invalid() -> Self {
        Self {
            valid: false,
            duration_seconds: 0.0,
            energy_mean: 0.0,
            energy_std: 0.0,
            energy_min: 0.0,
            energy_max: 0.0,
            energy_range: 0.0,
            pitch_median_hz: 0.0,
            pitch_mean_hz: 0.0,
            pitch_std_hz: 0.0,
            pitch_min_hz: 0.0,
            pitch_max_hz: 0.0,
            pitch_observation_count: 0,
            spectral_centroid_hz: 0.0,
            spectral_centroid_std_hz: 0.0,
            spectral_rolloff_hz: 0.0,
            spectral_bandwidth_hz: 0.0,
            spectral_contrast_db: 0.0,
            spectral_flatness: 0.0,
            clarity: 0.0,
            noise_level: 0.0,
            tempo_bpm: 0.0,
            speaking_rate: 0.0,
            voice_type: VoiceType::Unknown,
            voice_type_confidence: 0.0,
            mfcc: MfccSummary::default(),
        }
    }

    /// Robust pitch range (90th - 10th percentile of retained observations)
    pub fn pitch_range_hz(&self) -> f32 {
        self.pitch_max_hz - self.pitch_min_hz
    }
}

// ============================================================================
// Quality assessment
// ============================================================================

/// Qualitative rating bucket for a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityRating {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl QualityRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityRating::Excellent => "excellent",
            QualityRating::Good => "good",
            QualityRating::Acceptable => "acceptable",
            QualityRating::Poor => "poor",
        }
    }
}

/// The four normalized factors feeding the composite score
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QualityFactors {
    /// min(1, duration / 60s)
    pub duration: f32,
    /// 1 - |energy - optimal| / optimal, clamped to [0, 1]
    pub energy: f32,
    /// 1 - min(1, pitch_std / 50 Hz)
    pub pitch_stability: f32,
    /// 1 - min(1, centroid_std / 1000 Hz)
    pub spectral_consistency: f32,
}

/// Per-gate results of the hard validation checks
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValidationChecks {
    /// score >= caller-supplied minimum quality
    pub score_met: bool,
    /// duration >= minimum duration floor
    pub duration_met: bool,
    /// pitch range (p90 - p10) > minimum range
    pub pitch_range_met: bool,
    /// clarity > minimum clarity
    pub clarity_met: bool,
    /// noise level < maximum noise
    pub noise_met: bool,
}

impl ValidationChecks {
    pub fn all_met(&self) -> bool {
        self.score_met
            && self.duration_met
            && self.pitch_range_met
            && self.clarity_met
            && self.noise_met
    }
}

/// Composite quality verdict for one segment
///
/// Created once per candidate, immutable. `passed` is the conjunction of
/// every gate in `checks`; the score alone is never sufficient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Composite score in [0, 1], mean of the four factors
    pub score: f32,
    /// Thresholded qualitative rating
    pub rating: QualityRating,
    /// All hard gates met
    pub passed: bool,
    /// Individual factor values
    pub factors: QualityFactors,
    /// Individual gate results
    pub checks: ValidationChecks,
    /// Actionable improvement suggestions derived from failed gates
    pub suggestions: Vec<String>,
}

// ============================================================================
// Stage outcomes
// ============================================================================

/// Whether spectral subtraction was actually applied
///
/// `Bypassed` means a numerical failure was recovered by passing the
/// original waveform through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionOutcome {
    Applied,
    Bypassed,
}

/// How segmentation produced its candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationOutcome {
    /// At least one qualifying voice run was found
    Segmented,
    /// No qualifying run; the whole clip was returned as the sole candidate
    FellBackToWholeClip,
}

/// What the basic cleanup stage did to the waveform
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Input duration in seconds
    pub duration_seconds: f32,
    /// DC offset (mean) subtracted from every sample
    pub dc_offset_removed: f32,
    /// Gain applied to reach the peak target
    pub normalization_factor: f32,
    /// Absolute peak before normalization
    pub peak_before: f32,
    /// Absolute peak after normalization and pre-emphasis
    pub peak_after: f32,
}

// ============================================================================
// Detection report
// ============================================================================

/// One row of the adaptive energy threshold table
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnergyPercentile {
    pub percentile: f32,
    pub value: f32,
}

/// Span of one detected voice segment, in frames and seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmentSpan {
    pub index: usize,
    pub start_frame: usize,
    pub end_frame: usize,
    pub start_seconds: f32,
    pub end_seconds: f32,
    pub duration_seconds: f32,
    /// Mean framed RMS energy inside the span
    pub mean_energy: f32,
}

/// Diagnostic record of one segmentation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Input clip duration in seconds
    pub duration_seconds: f32,
    /// Input sample rate in Hz
    pub sample_rate: u32,
    /// Analysis frame length in milliseconds
    pub frame_ms: f32,
    /// Analysis hop length in milliseconds
    pub hop_ms: f32,
    /// Number of analysis frames
    pub total_frames: usize,
    /// Mean framed RMS energy
    pub energy_mean: f32,
    /// Standard deviation of framed RMS energy
    pub energy_std: f32,
    /// Minimum framed RMS energy
    pub energy_min: f32,
    /// Maximum framed RMS energy
    pub energy_max: f32,
    /// Energy distribution at the 10/20/30/40/50th percentiles
    pub energy_percentiles: Vec<EnergyPercentile>,
    /// The threshold actually applied to classify frames
    pub threshold: f32,
    /// Percentage of frames classified as voiced
    pub voiced_percent: f32,
    /// Spans of the segments that were returned
    pub spans: Vec<SegmentSpan>,
    /// Candidate runs discarded for being shorter than the duration floor
    pub discarded_short_runs: usize,
    /// Present when the whole clip was returned as the fallback candidate
    pub fallback_note: Option<String>,
}

// ============================================================================
// Pipeline result
// ============================================================================

/// Per-segment entry of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentReport {
    /// Position among the run's candidates
    pub index: usize,
    pub start_seconds: f32,
    pub end_seconds: f32,
    pub duration_seconds: f32,
    /// Exported segment audio (WAV)
    pub audio_path: PathBuf,
    /// JSON sidecar holding this entry, keyed to the audio by base name
    pub sidecar_path: PathBuf,
    pub metrics: AcousticMetrics,
    pub assessment: QualityAssessment,
}

/// Caller-facing guidance block of a run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    /// Best segment passed every validation gate
    pub suitable_for_cloning: bool,
    /// Suggestions carried over from the best segment's assessment
    pub improvements: Vec<String>,
    /// Coarse compatibility bucket for the best segment's score
    pub compatibility: QualityRating,
}

/// Aggregate outcome of one pipeline run
///
/// Persisted as `report.json` inside the run directory; a run directory
/// without it is transient garbage from an interrupted run. A new run
/// produces a new result, never patches an old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleProcessingResult {
    /// Unique id of this run
    pub run_id: Uuid,
    /// Original input file (never deleted by the pipeline)
    pub source_path: PathBuf,
    /// Run directory holding every artifact of this run
    pub output_dir: PathBuf,
    /// Cleaned (suppressed) full-length audio
    pub cleaned_path: PathBuf,
    /// Name of the processing profile used
    pub profile: String,
    /// Caller-supplied minimum quality gate
    pub min_quality: f32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Wall-clock processing time in seconds
    pub processing_seconds: f32,
    /// Present when the profile ran basic cleanup
    pub cleanup: Option<CleanupReport>,
    pub suppression: SuppressionOutcome,
    pub segmentation: SegmentationOutcome,
    pub detection: DetectionReport,
    pub segments: Vec<SegmentReport>,
    /// Index into `segments` of the highest-scoring candidate
    pub best_segment_index: Option<usize>,
    /// Best segment passed every validation gate
    pub quality_met: bool,
    pub recommendations: Recommendations,
}

impl SampleProcessingResult {
    /// The highest-scoring segment entry, if any candidate was scored
    pub fn best_segment(&self) -> Option<&SegmentReport> {
        self.best_segment_index.and_then(|i| self.segments.get(i))
    }
}
