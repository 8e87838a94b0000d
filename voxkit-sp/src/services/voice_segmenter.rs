//! Voice-activity segmentation
//!
//! Splits a cleaned waveform into candidate voice segments from framed
//! energy (and, in the stricter variant, energy plus spectral centroid)
//! thresholding. Candidate runs shorter than the duration floor are
//! discarded entirely. A non-empty clip that produces no qualifying run
//! falls back to the whole clip as the sole candidate so the pipeline
//! always has something to score.

use serde::Deserialize;
use tracing::{debug, warn};
use voxkit_common::params;

use crate::audio::AudioClip;
use crate::dsp::{spectral, stats};
use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DetectionReport, EnergyPercentile, SegmentSpan, SegmentationOutcome};

/// Frame classification strategy
///
/// Neither alone is robust across sources: the adaptive energy threshold
/// handles wildly varying absolute loudness, while the centroid term helps
/// reject low-frequency music/noise that passes an energy-only gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationStrategy {
    /// Adaptive percentile threshold over the clip's own energy distribution
    EnergyOnly,
    /// Z-scored energy and centroid averaged against a fixed threshold
    EnergyAndCentroid,
}

/// Segmentation configuration
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub strategy: SegmentationStrategy,
    /// Energy percentile for the adaptive threshold (energy-only)
    pub energy_percentile: f32,
    /// Fixed normalized threshold (energy+centroid)
    pub combined_threshold: f32,
    /// Analysis frame length in milliseconds
    pub frame_ms: f32,
    /// Analysis hop length in milliseconds
    pub hop_ms: f32,
    /// Runs shorter than this are discarded
    pub min_segment_secs: f32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            strategy: SegmentationStrategy::EnergyOnly,
            energy_percentile: params::VAD_ENERGY_PERCENTILE,
            combined_threshold: params::VAD_COMBINED_THRESHOLD,
            frame_ms: params::ENERGY_FRAME_MS,
            hop_ms: params::ENERGY_HOP_MS,
            min_segment_secs: params::MIN_SEGMENT_SECS_LIGHT,
        }
    }
}

/// Result of one segmentation pass
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Candidate segments; `report.spans[i]` describes `segments[i]`
    pub segments: Vec<AudioClip>,
    pub report: DetectionReport,
    pub outcome: SegmentationOutcome,
}

/// Voice activity segmenter
pub struct VoiceSegmenter {
    config: SegmenterConfig,
}

impl VoiceSegmenter {
    /// Create a segmenter with the default (light) configuration
    pub fn new() -> Self {
        Self {
            config: SegmenterConfig::default(),
        }
    }

    /// Create a segmenter from a full configuration, validating it
    pub fn with_config(config: SegmenterConfig) -> ProcessingResult<Self> {
        if !(0.0..100.0).contains(&config.energy_percentile) || config.energy_percentile <= 0.0 {
            return Err(ProcessingError::InvalidInput(
                "Energy percentile must be in (0, 100)".to_string(),
            ));
        }
        if config.frame_ms <= 0.0 || config.hop_ms <= 0.0 {
            return Err(ProcessingError::InvalidInput(
                "Frame and hop lengths must be positive".to_string(),
            ));
        }
        if config.hop_ms > config.frame_ms {
            return Err(ProcessingError::InvalidInput(
                "Hop must not exceed frame length".to_string(),
            ));
        }
        if config.min_segment_secs <= 0.0 {
            return Err(ProcessingError::InvalidInput(
                "Minimum segment duration must be positive".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Set the classification strategy
    pub fn with_strategy(mut self, strategy: SegmentationStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the minimum segment duration
    pub fn with_min_segment_secs(mut self, secs: f32) -> ProcessingResult<Self> {
        if secs <= 0.0 {
            return Err(ProcessingError::InvalidInput(
                "Minimum segment duration must be positive".to_string(),
            ));
        }
        self.config.min_segment_secs = secs;
        Ok(self)
    }

    /// Set the adaptive energy threshold percentile
    pub fn with_energy_percentile(mut self, percentile: f32) -> ProcessingResult<Self> {
        if percentile <= 0.0 || percentile >= 100.0 {
            return Err(ProcessingError::InvalidInput(
                "Energy percentile must be in (0, 100)".to_string(),
            ));
        }
        self.config.energy_percentile = percentile;
        Ok(self)
    }

    /// Split a clip into candidate voice segments
    pub fn segment(&self, clip: &AudioClip) -> Segmentation {
        let sample_rate = clip.sample_rate;
        let frame_len = ((self.config.frame_ms / 1000.0 * sample_rate as f32) as usize).max(1);
        let hop = ((self.config.hop_ms / 1000.0 * sample_rate as f32) as usize).max(1);

        let energies = stats::frame_rms(&clip.samples, frame_len, hop);
        let total_frames = energies.len();

        if clip.is_empty() || total_frames == 0 {
            return Segmentation {
                segments: Vec::new(),
                report: self.empty_report(clip),
                outcome: SegmentationOutcome::Segmented,
            };
        }

        let (voiced, threshold) = match self.config.strategy {
            SegmentationStrategy::EnergyOnly => {
                let threshold = stats::percentile(&energies, self.config.energy_percentile);
                let flags = energies.iter().map(|&e| e > threshold).collect();
                (flags, threshold)
            }
            SegmentationStrategy::EnergyAndCentroid => {
                let centroids = frame_centroids(&clip.samples, frame_len, hop, sample_rate);
                let flags = combined_flags(&energies, &centroids, self.config.combined_threshold);
                (flags, self.config.combined_threshold)
            }
        };
        let voiced_count = voiced.iter().filter(|&&v| v).count();

        // Scan voice/non-voice flags for contiguous runs; a run ends on a
        // voice -> non-voice transition or at end-of-stream
        let mut spans: Vec<SegmentSpan> = Vec::new();
        let mut segments: Vec<AudioClip> = Vec::new();
        let mut discarded_short_runs = 0usize;
        let mut run_start: Option<usize> = None;

        for i in 0..=total_frames {
            let is_voice = i < total_frames && voiced[i];
            match (run_start, is_voice) {
                (None, true) => run_start = Some(i),
                (Some(start), false) => {
                    let start_sample = start * hop;
                    let end_sample = ((i - 1) * hop + frame_len).min(clip.len());
                    let duration = (end_sample - start_sample) as f32 / sample_rate as f32;

                    if duration >= self.config.min_segment_secs {
                        spans.push(SegmentSpan {
                            index: spans.len(),
                            start_frame: start,
                            end_frame: i,
                            start_seconds: start_sample as f32 / sample_rate as f32,
                            end_seconds: end_sample as f32 / sample_rate as f32,
                            duration_seconds: duration,
                            mean_energy: stats::mean(&energies[start..i]),
                        });
                        segments.push(clip.slice(start_sample, end_sample));
                    } else {
                        discarded_short_runs += 1;
                    }
                    run_start = None;
                }
                _ => {}
            }
        }

        // Whole-clip fallback guarantees at least one candidate for any
        // non-empty input
        let (outcome, fallback_note) = if segments.is_empty() {
            warn!(
                discarded_short_runs,
                "No qualifying voice runs, falling back to the whole clip"
            );
            spans.push(SegmentSpan {
                index: 0,
                start_frame: 0,
                end_frame: total_frames,
                start_seconds: 0.0,
                end_seconds: clip.duration_seconds(),
                duration_seconds: clip.duration_seconds(),
                mean_energy: stats::mean(&energies),
            });
            segments.push(clip.clone());
            (
                SegmentationOutcome::FellBackToWholeClip,
                Some("no qualifying voice runs; whole clip used as sole candidate".to_string()),
            )
        } else {
            (SegmentationOutcome::Segmented, None)
        };

        debug!(
            total_frames,
            voiced_count,
            segments = segments.len(),
            discarded_short_runs,
            ?outcome,
            "Segmentation complete"
        );

        let report = DetectionReport {
            duration_seconds: clip.duration_seconds(),
            sample_rate,
            frame_ms: self.config.frame_ms,
            hop_ms: self.config.hop_ms,
            total_frames,
            energy_mean: stats::mean(&energies),
            energy_std: stats::std_dev(&energies),
            energy_min: stats::min(&energies),
            energy_max: stats::max(&energies),
            energy_percentiles: [10.0, 20.0, 30.0, 40.0, 50.0]
                .iter()
                .map(|&p| EnergyPercentile {
                    percentile: p,
                    value: stats::percentile(&energies, p),
                })
                .collect(),
            threshold,
            voiced_percent: voiced_count as f32 / total_frames as f32 * 100.0,
            spans,
            discarded_short_runs,
            fallback_note,
        };

        Segmentation {
            segments,
            report,
            outcome,
        }
    }

    fn empty_report(&self, clip: &AudioClip) -> DetectionReport {
        DetectionReport {
            duration_seconds: clip.duration_seconds(),
            sample_rate: clip.sample_rate,
            frame_ms: self.config.frame_ms,
            hop_ms: self.config.hop_ms,
            total_frames: 0,
            energy_mean: 0.0,
            energy_std: 0.0,
            energy_min: 0.0,
            energy_max: 0.0,
            energy_percentiles: Vec::new(),
            threshold: 0.0,
            voiced_percent: 0.0,
            spans: Vec::new(),
            discarded_short_runs: 0,
            fallback_note: None,
        }
    }
}

impl Default for VoiceSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Spectral centroid per analysis frame, on the same grid as `frame_rms`
fn frame_centroids(samples: &[f32], frame_len: usize, hop: usize, sample_rate: u32) -> Vec<f32> {
    let centroid_of = |frame: &[f32]| {
        let window = spectral::hann_window(frame.len());
        let windowed: Vec<f32> = frame.iter().zip(&window).map(|(s, w)| s * w).collect();
        let fft = spectral::forward_fft(&windowed);
        let n_bins = frame.len() / 2 + 1;
        let mags: Vec<f32> = fft.iter().take(n_bins).map(|c| c.norm()).collect();
        let freqs: Vec<f32> = (0..n_bins)
            .map(|k| k as f32 * sample_rate as f32 / frame.len() as f32)
            .collect();
        spectral::centroid(&mags, &freqs)
    };

    if samples.is_empty() {
        return Vec::new();
    }
    if samples.len() < frame_len {
        return vec![centroid_of(samples)];
    }

    let mut centroids = Vec::with_capacity((samples.len() - frame_len) / hop + 1);
    let mut start = 0;
    while start + frame_len <= samples.len() {
        centroids.push(centroid_of(&samples[start..start + frame_len]));
        start += hop;
    }
    centroids
}

/// Z-score both features, average them, threshold at a fixed level
fn combined_flags(energies: &[f32], centroids: &[f32], threshold: f32) -> Vec<bool> {
    let z = |values: &[f32]| -> Vec<f32> {
        let mean = stats::mean(values);
        let std = stats::std_dev(values);
        if std <= 1e-10 {
            return vec![0.0; values.len()];
        }
        values.iter().map(|&v| (v - mean) / std).collect()
    };

    let ze = z(energies);
    let zc = z(centroids);
    ze.iter()
        .zip(zc.iter())
        .map(|(e, c)| (e + c) / 2.0 > threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, amplitude: f32, sample_rate: u32, count: usize) -> Vec<f32> {
        (0..count)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_percentile = SegmenterConfig {
            energy_percentile: 0.0,
            ..Default::default()
        };
        assert!(VoiceSegmenter::with_config(bad_percentile).is_err());

        let bad_hop = SegmenterConfig {
            frame_ms: 10.0,
            hop_ms: 25.0,
            ..Default::default()
        };
        assert!(VoiceSegmenter::with_config(bad_hop).is_err());

        assert!(VoiceSegmenter::new().with_min_segment_secs(-1.0).is_err());
        assert!(VoiceSegmenter::new().with_energy_percentile(100.0).is_err());
    }

    #[test]
    fn test_empty_clip_yields_zero_segments() {
        let clip = AudioClip::new(Vec::new(), 22050);
        let result = VoiceSegmenter::new().segment(&clip);

        assert!(result.segments.is_empty());
        assert_eq!(result.outcome, SegmentationOutcome::Segmented);
        assert_eq!(result.report.total_frames, 0);
    }

    #[test]
    fn test_detects_voice_between_silence() {
        let sample_rate = 22050u32;
        // 2s tone, 2s silence, 2s tone
        let mut samples = tone(300.0, 0.5, sample_rate, 2 * sample_rate as usize);
        samples.extend(vec![0.0f32; 2 * sample_rate as usize]);
        samples.extend(tone(300.0, 0.5, sample_rate, 2 * sample_rate as usize));
        let clip = AudioClip::new(samples, sample_rate);

        let segmenter = VoiceSegmenter::new().with_min_segment_secs(1.0).unwrap();
        let result = segmenter.segment(&clip);

        assert_eq!(result.outcome, SegmentationOutcome::Segmented);
        assert_eq!(result.segments.len(), 2, "Expected two voice segments");

        let first = &result.report.spans[0];
        assert!(first.start_seconds < 0.1);
        assert!(
            (first.end_seconds - 2.0).abs() < 0.2,
            "First segment ends at {}",
            first.end_seconds
        );

        let second = &result.report.spans[1];
        assert!(
            (second.start_seconds - 4.0).abs() < 0.2,
            "Second segment starts at {}",
            second.start_seconds
        );
    }

    #[test]
    fn test_short_runs_are_discarded() {
        let sample_rate = 22050u32;
        // A 0.3s blip between silence, below the 1s floor
        let mut samples = vec![0.0f32; sample_rate as usize];
        samples.extend(tone(300.0, 0.5, sample_rate, (0.3 * sample_rate as f32) as usize));
        samples.extend(vec![0.0f32; sample_rate as usize]);
        let clip = AudioClip::new(samples, sample_rate);

        let segmenter = VoiceSegmenter::new().with_min_segment_secs(1.0).unwrap();
        let result = segmenter.segment(&clip);

        // The blip is discarded, so the whole clip comes back as fallback
        assert_eq!(result.outcome, SegmentationOutcome::FellBackToWholeClip);
        assert_eq!(result.segments.len(), 1);
        assert!(result.report.discarded_short_runs >= 1);
        assert!(result.report.fallback_note.is_some());
        assert_eq!(result.segments[0].len(), clip.len());
    }

    #[test]
    fn test_uniform_clip_falls_back_to_whole() {
        let sample_rate = 22050u32;
        // Constant tone: every frame has equal energy, none strictly above
        // the adaptive threshold, so no run forms
        let samples = tone(300.0, 0.5, sample_rate, 3 * sample_rate as usize);
        let clip = AudioClip::new(samples, sample_rate);

        let result = VoiceSegmenter::new().segment(&clip);

        assert_eq!(result.outcome, SegmentationOutcome::FellBackToWholeClip);
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.report.spans.len(), 1);
        assert!(
            (result.report.spans[0].duration_seconds - 3.0).abs() < 0.01,
            "Fallback span must cover the whole input"
        );
    }

    #[test]
    fn test_clip_shorter_than_floor_never_truncated() {
        let sample_rate = 22050u32;
        // 1s of voice against the default 30s floor: either zero segments
        // or exactly one fallback spanning the entire input
        let mut samples = tone(300.0, 0.5, sample_rate, sample_rate as usize / 2);
        samples.extend(vec![0.0f32; sample_rate as usize / 2]);
        let clip = AudioClip::new(samples, sample_rate);

        let result = VoiceSegmenter::new().segment(&clip);

        assert_eq!(result.outcome, SegmentationOutcome::FellBackToWholeClip);
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].len(), clip.len());
    }

    #[test]
    fn test_energy_and_centroid_strategy() {
        let sample_rate = 22050u32;
        // Quiet low rumble then loud speech-band tone: only the second half
        // scores high on both features
        let mut samples = tone(100.0, 0.05, sample_rate, 2 * sample_rate as usize);
        samples.extend(tone(1000.0, 0.5, sample_rate, 2 * sample_rate as usize));
        let clip = AudioClip::new(samples, sample_rate);

        let segmenter = VoiceSegmenter::new()
            .with_strategy(SegmentationStrategy::EnergyAndCentroid)
            .with_min_segment_secs(1.0)
            .unwrap();
        let result = segmenter.segment(&clip);

        assert_eq!(result.outcome, SegmentationOutcome::Segmented);
        assert_eq!(result.segments.len(), 1);
        let span = &result.report.spans[0];
        assert!(
            (span.start_seconds - 2.0).abs() < 0.2,
            "Segment starts at {}, expected ~2.0",
            span.start_seconds
        );
    }

    #[test]
    fn test_report_statistics() {
        let sample_rate = 22050u32;
        let mut samples = tone(300.0, 0.5, sample_rate, 2 * sample_rate as usize);
        samples.extend(vec![0.0f32; 2 * sample_rate as usize]);
        let clip = AudioClip::new(samples, sample_rate);

        let result = VoiceSegmenter::new().with_min_segment_secs(1.0).unwrap().segment(&clip);
        let report = &result.report;

        assert_eq!(report.sample_rate, sample_rate);
        assert!(report.total_frames > 0);
        assert_eq!(report.energy_percentiles.len(), 5);
        for pair in report.energy_percentiles.windows(2) {
            assert!(pair[0].value <= pair[1].value, "Percentile table not ordered");
        }
        assert!(report.voiced_percent > 0.0 && report.voiced_percent <= 100.0);
        assert!(report.energy_max >= report.energy_mean);
        assert_eq!(report.spans.len(), result.segments.len());
    }
}
