//! Pipeline stage services
//!
//! Each service owns one stage of sample processing and a validated config
//! struct defaulting to the constants in `voxkit_common::params`.

pub mod noise_suppressor;
pub mod pipeline;
pub mod quality_scorer;
pub mod signal_analyzer;
pub mod voice_segmenter;
pub mod waveform_cleaner;

pub use noise_suppressor::{NoiseSuppressor, SuppressorConfig};
pub use pipeline::{ProcessingProfile, SamplePipeline};
pub use quality_scorer::{QualityScorer, ScoringConfig};
pub use signal_analyzer::{AnalyzerConfig, SignalAnalyzer};
pub use voice_segmenter::{Segmentation, SegmentationStrategy, SegmenterConfig, VoiceSegmenter};
pub use waveform_cleaner::{CleanerConfig, WaveformCleaner};
