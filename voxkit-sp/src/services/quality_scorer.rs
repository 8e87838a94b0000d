//! Composite quality scoring and validation
//!
//! Turns an `AcousticMetrics` record into a bounded composite score, a
//! qualitative rating, hard-gate pass/fail checks, and actionable
//! improvement suggestions. Quality failure is an expected outcome carried
//! in the assessment, never an error.

use serde::Deserialize;
use tracing::debug;
use voxkit_common::params;

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{
    AcousticMetrics, QualityAssessment, QualityFactors, QualityRating, ValidationChecks,
};

/// Scoring and validation configuration
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Duration at which the duration factor saturates, seconds
    pub optimal_duration_secs: f32,
    /// Reference RMS energy the energy factor centers on
    pub optimal_energy_rms: f32,
    /// Pitch standard deviation at which stability reaches zero, Hz
    pub pitch_stability_span_hz: f32,
    /// Centroid standard deviation at which consistency reaches zero, Hz
    pub spectral_consistency_span_hz: f32,
    /// Rating cut points, score >= cut
    pub rating_excellent: f32,
    pub rating_good: f32,
    pub rating_acceptable: f32,
    /// Hard validation gates
    pub min_duration_secs: f32,
    pub min_pitch_range_hz: f32,
    pub min_clarity: f32,
    pub max_noise: f32,
    /// Suggestion thresholds
    pub low_energy: f32,
    pub high_energy: f32,
    pub high_pitch_std: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            optimal_duration_secs: params::OPTIMAL_DURATION_SECS,
            optimal_energy_rms: params::OPTIMAL_ENERGY_RMS,
            pitch_stability_span_hz: params::PITCH_STABILITY_SPAN_HZ,
            spectral_consistency_span_hz: params::SPECTRAL_CONSISTENCY_SPAN_HZ,
            rating_excellent: params::RATING_EXCELLENT,
            rating_good: params::RATING_GOOD,
            rating_acceptable: params::RATING_ACCEPTABLE,
            min_duration_secs: params::VALIDATION_MIN_DURATION_SECS,
            min_pitch_range_hz: params::VALIDATION_MIN_PITCH_RANGE_HZ,
            min_clarity: params::VALIDATION_MIN_CLARITY,
            max_noise: params::VALIDATION_MAX_NOISE,
            low_energy: params::SUGGESTION_LOW_ENERGY,
            high_energy: params::SUGGESTION_HIGH_ENERGY,
            high_pitch_std: params::SUGGESTION_HIGH_PITCH_STD,
        }
    }
}

/// Quality scoring service
pub struct QualityScorer {
    config: ScoringConfig,
}

impl QualityScorer {
    /// Create a scorer with the default configuration
    pub fn new() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }

    /// Create a scorer from a full configuration, validating it
    pub fn with_config(config: ScoringConfig) -> ProcessingResult<Self> {
        if config.optimal_energy_rms <= 0.0 || config.optimal_duration_secs <= 0.0 {
            return Err(ProcessingError::InvalidInput(
                "Optimal energy and duration must be positive".to_string(),
            ));
        }
        if config.pitch_stability_span_hz <= 0.0 || config.spectral_consistency_span_hz <= 0.0 {
            return Err(ProcessingError::InvalidInput(
                "Stability and consistency spans must be positive".to_string(),
            ));
        }
        if !(config.rating_excellent > config.rating_good
            && config.rating_good > config.rating_acceptable
            && config.rating_acceptable > 0.0)
        {
            return Err(ProcessingError::InvalidInput(
                "Rating cut points must descend and stay positive".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Score one segment's metrics against a caller-supplied minimum quality
    pub fn score(&self, metrics: &AcousticMetrics, min_quality: f32) -> QualityAssessment {
        if !metrics.valid {
            return QualityAssessment {
                score: 0.0,
                rating: QualityRating::Poor,
                passed: false,
                factors: QualityFactors::default(),
                checks: ValidationChecks {
                    score_met: false,
                    duration_met: false,
                    pitch_range_met: false,
                    clarity_met: false,
                    noise_met: false,
                },
                suggestions: vec![
                    "Sample could not be analyzed; provide a readable, non-empty recording"
                        .to_string(),
                ],
            };
        }

        let factors = QualityFactors {
            duration: (metrics.duration_seconds / self.config.optimal_duration_secs).min(1.0),
            energy: (1.0
                - (metrics.energy_mean - self.config.optimal_energy_rms).abs()
                    / self.config.optimal_energy_rms)
                .clamp(0.0, 1.0),
            pitch_stability: 1.0
                - (metrics.pitch_std_hz / self.config.pitch_stability_span_hz).min(1.0),
            spectral_consistency: 1.0
                - (metrics.spectral_centroid_std_hz / self.config.spectral_consistency_span_hz)
                    .min(1.0),
        };

        let score = (factors.duration
            + factors.energy
            + factors.pitch_stability
            + factors.spectral_consistency)
            / 4.0;

        let rating = self.rate(score);

        // The score alone is never sufficient: a high score on a
        // near-silent or monotone short clip is unusable for cloning
        let checks = ValidationChecks {
            score_met: score >= min_quality,
            duration_met: metrics.duration_seconds >= self.config.min_duration_secs,
            pitch_range_met: metrics.pitch_range_hz() > self.config.min_pitch_range_hz,
            clarity_met: metrics.clarity > self.config.min_clarity,
            noise_met: metrics.noise_level < self.config.max_noise,
        };
        let passed = checks.all_met();

        let suggestions = self.suggest(metrics, &checks);

        debug!(
            score,
            rating = rating.as_str(),
            passed,
            suggestions = suggestions.len(),
            "Quality assessment complete"
        );

        QualityAssessment {
            score,
            rating,
            passed,
            factors,
            checks,
            suggestions,
        }
    }

    fn rate(&self, score: f32) -> QualityRating {
        if score >= self.config.rating_excellent {
            QualityRating::Excellent
        } else if score >= self.config.rating_good {
            QualityRating::Good
        } else if score >= self.config.rating_acceptable {
            QualityRating::Acceptable
        } else {
            QualityRating::Poor
        }
    }

    /// Actionable feedback from whichever sub-check or bound failed
    fn suggest(&self, metrics: &AcousticMetrics, checks: &ValidationChecks) -> Vec<String> {
        let mut suggestions = Vec::new();

        if metrics.duration_seconds < self.config.min_duration_secs {
            suggestions.push(format!(
                "Sample is short ({:.1}s); record at least {:.0} seconds of continuous speech",
                metrics.duration_seconds, self.config.min_duration_secs
            ));
        }
        if metrics.energy_mean < self.config.low_energy {
            suggestions.push(
                "Recording is too quiet; re-record closer to the microphone or raise the gain"
                    .to_string(),
            );
        } else if metrics.energy_mean > self.config.high_energy {
            suggestions.push(
                "Recording is too loud and may clip; re-record with lower input gain".to_string(),
            );
        }
        if metrics.pitch_std_hz > self.config.high_pitch_std {
            suggestions.push(
                "Pitch varies a lot; use a calmer, steadier delivery".to_string(),
            );
        }
        if !checks.pitch_range_met {
            suggestions.push(
                "Speech sounds monotone; speak with natural intonation".to_string(),
            );
        }
        if !checks.clarity_met {
            suggestions.push(
                "Low clarity; re-record in a quieter space with less reverberation".to_string(),
            );
        }
        if !checks.noise_met {
            suggestions.push(
                "High background noise; move away from noise sources before recording"
                    .to_string(),
            );
        }

        if suggestions.is_empty() {
            suggestions.push("Sample quality is good; no changes needed".to_string());
        }
        suggestions
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MfccSummary, VoiceType};

    /// Metrics of an idealized long, clean, steady narration
    fn good_metrics() -> AcousticMetrics {
        AcousticMetrics {
            valid: true,
            duration_seconds: 60.0,
            energy_mean: 0.1,
            energy_std: 0.02,
            energy_min: 0.05,
            energy_max: 0.15,
            energy_range: 0.1,
            pitch_median_hz: 180.0,
            pitch_mean_hz: 182.0,
            pitch_std_hz: 20.0,
            pitch_min_hz: 140.0,
            pitch_max_hz: 240.0,
            pitch_observation_count: 500,
            spectral_centroid_hz: 1800.0,
            spectral_centroid_std_hz: 200.0,
            spectral_rolloff_hz: 3500.0,
            spectral_bandwidth_hz: 1500.0,
            spectral_contrast_db: 22.0,
            spectral_flatness: 0.2,
            clarity: 0.55,
            noise_level: 0.2,
            tempo_bpm: 110.0,
            speaking_rate: 1.83,
            voice_type: VoiceType::Female,
            voice_type_confidence: 0.7,
            mfcc: MfccSummary::default(),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_cuts = ScoringConfig {
            rating_excellent: 0.4,
            rating_good: 0.6,
            ..Default::default()
        };
        assert!(QualityScorer::with_config(bad_cuts).is_err());

        let bad_energy = ScoringConfig {
            optimal_energy_rms: 0.0,
            ..Default::default()
        };
        assert!(QualityScorer::with_config(bad_energy).is_err());
    }

    #[test]
    fn test_good_sample_passes() {
        let assessment = QualityScorer::new().score(&good_metrics(), 0.6);

        assert!(assessment.score > 0.6, "Score: {}", assessment.score);
        assert!(assessment.passed);
        assert!(assessment.checks.all_met());
        assert_eq!(assessment.suggestions.len(), 1);
        assert!(assessment.suggestions[0].contains("good"));
    }

    #[test]
    fn test_score_bounded() {
        let scorer = QualityScorer::new();
        for (duration, energy, pitch_std, centroid_std) in [
            (0.0, 0.0, 0.0, 0.0),
            (600.0, 0.9, 500.0, 10_000.0),
            (30.0, 0.1, 50.0, 1000.0),
        ] {
            let metrics = AcousticMetrics {
                duration_seconds: duration,
                energy_mean: energy,
                pitch_std_hz: pitch_std,
                spectral_centroid_std_hz: centroid_std,
                ..good_metrics()
            };
            let assessment = scorer.score(&metrics, 0.5);
            assert!(
                (0.0..=1.0).contains(&assessment.score),
                "Score out of bounds: {}",
                assessment.score
            );
        }
    }

    #[test]
    fn test_score_monotone_in_pitch_std() {
        // Holding everything else fixed, more pitch variance never raises
        // the score
        let scorer = QualityScorer::new();
        let mut previous = f32::INFINITY;
        for pitch_std in [0.0, 5.0, 10.0, 25.0, 40.0, 50.0, 75.0, 120.0, 300.0] {
            let metrics = AcousticMetrics {
                pitch_std_hz: pitch_std,
                ..good_metrics()
            };
            let score = scorer.score(&metrics, 0.5).score;
            assert!(
                score <= previous,
                "Score rose from {} to {} at pitch_std {}",
                previous,
                score,
                pitch_std
            );
            previous = score;
        }
    }

    #[test]
    fn test_short_clip_fails_duration_gate() {
        let metrics = AcousticMetrics {
            duration_seconds: 10.0,
            ..good_metrics()
        };
        let assessment = QualityScorer::new().score(&metrics, 0.3);

        assert!(!assessment.passed);
        assert!(!assessment.checks.duration_met);
        assert!(
            assessment.suggestions.iter().any(|s| s.contains("short")),
            "Suggestions: {:?}",
            assessment.suggestions
        );
    }

    #[test]
    fn test_monotone_clip_fails_pitch_range_gate() {
        let metrics = AcousticMetrics {
            pitch_min_hz: 170.0,
            pitch_max_hz: 190.0,
            ..good_metrics()
        };
        let assessment = QualityScorer::new().score(&metrics, 0.3);

        assert!(!assessment.passed);
        assert!(!assessment.checks.pitch_range_met);
        assert!(assessment
            .suggestions
            .iter()
            .any(|s| s.contains("monotone")));
    }

    #[test]
    fn test_quiet_clip_gets_energy_suggestion() {
        let metrics = AcousticMetrics {
            energy_mean: 0.01,
            ..good_metrics()
        };
        let assessment = QualityScorer::new().score(&metrics, 0.3);

        assert!(assessment.suggestions.iter().any(|s| s.contains("quiet")));
        assert!(assessment.factors.energy < 0.2);
    }

    #[test]
    fn test_loud_clip_gets_energy_suggestion() {
        let metrics = AcousticMetrics {
            energy_mean: 0.4,
            ..good_metrics()
        };
        let assessment = QualityScorer::new().score(&metrics, 0.3);
        assert!(assessment.suggestions.iter().any(|s| s.contains("loud")));
    }

    #[test]
    fn test_rating_thresholds() {
        let scorer = QualityScorer::new();
        // Engineer factor inputs that land on each side of the cuts
        let rate_of = |duration: f32, energy: f32, pitch_std: f32, centroid_std: f32| {
            let metrics = AcousticMetrics {
                duration_seconds: duration,
                energy_mean: energy,
                pitch_std_hz: pitch_std,
                spectral_centroid_std_hz: centroid_std,
                ..good_metrics()
            };
            scorer.score(&metrics, 0.5)
        };

        // All factors 1.0 -> score 1.0 -> excellent
        let best = rate_of(60.0, 0.1, 0.0, 0.0);
        assert_eq!(best.rating, QualityRating::Excellent);

        // All factors 0 -> score 0 -> poor
        let worst = rate_of(0.0, 0.5, 100.0, 5000.0);
        assert_eq!(worst.rating, QualityRating::Poor);
    }

    #[test]
    fn test_invalid_metrics_score_zero() {
        let assessment = QualityScorer::new().score(&AcousticMetrics::invalid(), 0.1);

        assert_eq!(assessment.score, 0.0);
        assert_eq!(assessment.rating, QualityRating::Poor);
        assert!(!assessment.passed);
        assert!(!assessment.checks.all_met());
        assert!(assessment.suggestions[0].contains("analyzed"));
    }

    #[test]
    fn test_min_quality_gate_respected() {
        let metrics = good_metrics();
        let scorer = QualityScorer::new();

        let lenient = scorer.score(&metrics, 0.1);
        assert!(lenient.checks.score_met);

        let impossible = scorer.score(&metrics, 0.99);
        assert!(!impossible.checks.score_met);
        assert!(!impossible.passed);
    }
}
