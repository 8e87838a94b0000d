//! Sample processing pipeline
//!
//! Orchestrates one run: decode, optional cleanup, noise suppression,
//! voice-activity segmentation, per-segment analysis and scoring,
//! best-segment selection, and persistence. Each run writes into its own
//! uniquely-named subdirectory of the output root; `report.json` is written
//! last, so a run directory without it is transient garbage from an
//! interrupted run.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::audio::{write_wav, AudioClip, AudioLoader};
use crate::error::{ProcessingError, ProcessingResult};
use crate::services::noise_suppressor::{NoiseSuppressor, SuppressorConfig};
use crate::services::quality_scorer::{QualityScorer, ScoringConfig};
use crate::services::signal_analyzer::{AnalyzerConfig, SignalAnalyzer};
use crate::services::voice_segmenter::{
    SegmentationStrategy, SegmenterConfig, VoiceSegmenter,
};
use crate::services::waveform_cleaner::{CleanerConfig, WaveformCleaner};
use crate::types::{
    QualityRating, Recommendations, SampleProcessingResult, SegmentReport,
};
use voxkit_common::params;

/// One named bundle of stage configurations
///
/// Two profiles ship by default: `light` (basic cleanup, adaptive
/// energy-only VAD, 30 s floor) and `strict` (no cleanup, energy+centroid
/// VAD, 60 s floor). All fields are public so embedding services can build
/// their own variants.
#[derive(Debug, Clone)]
pub struct ProcessingProfile {
    /// Profile name recorded in run reports
    pub name: String,
    /// Basic cleanup stage; `None` skips it
    pub cleanup: Option<CleanerConfig>,
    pub suppressor: SuppressorConfig,
    pub segmenter: SegmenterConfig,
    pub analyzer: AnalyzerConfig,
    pub scoring: ScoringConfig,
}

impl ProcessingProfile {
    /// Default profile: cleanup on, adaptive energy VAD, 30 s floor
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            cleanup: Some(CleanerConfig::default()),
            suppressor: SuppressorConfig::default(),
            segmenter: SegmenterConfig::default(),
            analyzer: AnalyzerConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }

    /// Alternate profile: energy+centroid VAD, 60 s floor, no cleanup
    pub fn strict() -> Self {
        Self {
            name: "strict".to_string(),
            cleanup: None,
            suppressor: SuppressorConfig::default(),
            segmenter: SegmenterConfig {
                strategy: SegmentationStrategy::EnergyAndCentroid,
                min_segment_secs: params::MIN_SEGMENT_SECS_STRICT,
                ..SegmenterConfig::default()
            },
            analyzer: AnalyzerConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Default for ProcessingProfile {
    fn default() -> Self {
        Self::light()
    }
}

/// Voice sample processing pipeline
pub struct SamplePipeline {
    profile: ProcessingProfile,
    output_root: PathBuf,
    loader: AudioLoader,
    cleaner: WaveformCleaner,
    suppressor: NoiseSuppressor,
    segmenter: VoiceSegmenter,
    analyzer: SignalAnalyzer,
    scorer: QualityScorer,
}

impl SamplePipeline {
    /// Build a pipeline writing under `output_root`, validating the profile
    pub fn new(output_root: impl Into<PathBuf>, profile: ProcessingProfile) -> ProcessingResult<Self> {
        let segmenter = VoiceSegmenter::with_config(profile.segmenter)?;
        let analyzer = SignalAnalyzer::with_config(profile.analyzer)?;
        let scorer = QualityScorer::with_config(profile.scoring)?;
        Ok(Self {
            cleaner: WaveformCleaner::with_config(profile.cleanup.unwrap_or_default())?,
            suppressor: NoiseSuppressor::with_config(profile.suppressor)?,
            segmenter,
            analyzer,
            scorer,
            profile,
            output_root: output_root.into(),
            loader: AudioLoader::default(),
        })
    }

    /// Override the working sample rate decoded audio is resampled to
    pub fn with_target_sample_rate(mut self, sample_rate: u32) -> Self {
        self.loader = AudioLoader::new(sample_rate);
        self
    }

    /// Process one recording into a validated reference-sample candidate
    ///
    /// Returns a full result even when the best segment fails validation
    /// (`quality_met == false`); callers decide whether to accept a
    /// sub-threshold sample. `NoVoiceDetected` surfaces only for empty or
    /// degenerate decodes. The original input file is never deleted.
    pub async fn process(
        &self,
        source: impl AsRef<Path>,
        min_quality: f32,
    ) -> ProcessingResult<SampleProcessingResult> {
        let source = source.as_ref();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();

        info!(
            source = %source.display(),
            profile = %self.profile.name,
            min_quality,
            %run_id,
            "Starting sample processing run"
        );

        let clip = self.loader.load(source)?;
        if clip.is_empty() {
            return Err(ProcessingError::NoVoiceDetected);
        }

        let run_dir = self.create_run_dir(source, run_id).await?;

        match self
            .run_stages(source, &run_dir, clip, min_quality, run_id, started_at)
            .await
        {
            Ok(result) => Ok(result),
            Err(e) => {
                // Partial artifacts without report.json are transient by
                // definition; remove them so the output root stays clean
                if let Err(cleanup_err) = tokio::fs::remove_dir_all(&run_dir).await {
                    warn!(
                        run_dir = %run_dir.display(),
                        error = %cleanup_err,
                        "Failed to remove transient run directory"
                    );
                }
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        source: &Path,
        run_dir: &Path,
        clip: AudioClip,
        min_quality: f32,
        run_id: Uuid,
        started_at: chrono::DateTime<Utc>,
    ) -> ProcessingResult<SampleProcessingResult> {
        // Stage 0: basic cleanup when the profile enables it
        let (clip, cleanup) = if self.profile.cleanup.is_some() {
            let (cleaned, report) = self.cleaner.clean(&clip);
            (cleaned, Some(report))
        } else {
            (clip, None)
        };

        // Stage 1: best-effort noise suppression, never fails the run
        let (clip, suppression) = self.suppressor.suppress(&clip);

        let cleaned_path = run_dir.join("cleaned.wav");
        write_wav(&cleaned_path, &clip)?;

        // Stage 2: voice-activity segmentation
        let segmentation = self.segmenter.segment(&clip);
        if segmentation.segments.is_empty() {
            return Err(ProcessingError::NoVoiceDetected);
        }

        // Stage 3: analyze and score every candidate, tracking the best
        let mut segments = Vec::with_capacity(segmentation.segments.len());
        let mut best_segment_index: Option<usize> = None;
        let mut best_score = f32::NEG_INFINITY;

        for (index, candidate) in segmentation.segments.iter().enumerate() {
            let metrics = self.analyzer.analyze(candidate);
            let assessment = self.scorer.score(&metrics, min_quality);

            let audio_path = run_dir.join(format!("segment_{:02}.wav", index));
            let sidecar_path = run_dir.join(format!("segment_{:02}.json", index));
            write_wav(&audio_path, candidate)?;

            let span = &segmentation.report.spans[index];
            let report = SegmentReport {
                index,
                start_seconds: span.start_seconds,
                end_seconds: span.end_seconds,
                duration_seconds: span.duration_seconds,
                audio_path,
                sidecar_path: sidecar_path.clone(),
                metrics,
                assessment,
            };
            write_json(&sidecar_path, &report).await?;

            if report.assessment.score > best_score {
                best_score = report.assessment.score;
                best_segment_index = Some(index);
            }
            segments.push(report);
        }

        // Stage 4: quality gate is a result field, never an error
        let best = best_segment_index.map(|i| &segments[i]);
        let quality_met = best.map(|s| s.assessment.passed).unwrap_or(false);

        let recommendations = Recommendations {
            suitable_for_cloning: quality_met,
            improvements: best
                .map(|s| s.assessment.suggestions.clone())
                .unwrap_or_default(),
            compatibility: best
                .map(|s| compatibility_rating(s.assessment.score))
                .unwrap_or(QualityRating::Poor),
        };

        let finished_at = Utc::now();
        let result = SampleProcessingResult {
            run_id,
            source_path: source.to_path_buf(),
            output_dir: run_dir.to_path_buf(),
            cleaned_path,
            profile: self.profile.name.clone(),
            min_quality,
            started_at,
            finished_at,
            processing_seconds: (finished_at - started_at).num_milliseconds() as f32 / 1000.0,
            cleanup,
            suppression,
            segmentation: segmentation.outcome,
            detection: segmentation.report,
            segments,
            best_segment_index,
            quality_met,
            recommendations,
        };

        // Stage 5: report.json last, marking the run complete
        write_json(&run_dir.join("report.json"), &result).await?;

        info!(
            %run_id,
            segments = result.segments.len(),
            best = ?result.best_segment_index,
            quality_met = result.quality_met,
            suppression = ?result.suppression,
            segmentation = ?result.segmentation,
            "Sample processing run complete"
        );
        if !result.quality_met {
            warn!(
                %run_id,
                score = best_score,
                "Best segment did not meet the quality gate"
            );
        }

        Ok(result)
    }

    /// Collision-free per-run directory: `<stem>_<UTC timestamp>_<id8>/`
    async fn create_run_dir(&self, source: &Path, run_id: Uuid) -> ProcessingResult<PathBuf> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sample");
        let id_hex = run_id.simple().to_string();
        let dir = self.output_root.join(format!(
            "{}_{}_{}",
            stem,
            Utc::now().format("%Y%m%d%H%M%S"),
            &id_hex[..8]
        ));

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            ProcessingError::Persistence(format!(
                "Failed to create run directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(dir)
    }
}

/// Coarse compatibility bucket for the recommendations block
fn compatibility_rating(score: f32) -> QualityRating {
    if score > params::COMPAT_EXCELLENT {
        QualityRating::Excellent
    } else if score > params::COMPAT_GOOD {
        QualityRating::Good
    } else if score > params::COMPAT_ACCEPTABLE {
        QualityRating::Acceptable
    } else {
        QualityRating::Poor
    }
}

/// Serialize a value as pretty JSON to disk
async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> ProcessingResult<()> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| ProcessingError::Persistence(format!("Serialize failed: {}", e)))?;
    tokio::fs::write(path, json).await.map_err(|e| {
        ProcessingError::Persistence(format!("Failed to write {}: {}", path.display(), e))
    })
}
