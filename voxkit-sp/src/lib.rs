//! # Voxkit Sample Processing
//!
//! Decides whether a noisy speech recording is usable as a voice-cloning
//! reference sample and, when it is, produces a cleaned, well-bounded
//! segment plus a structured quality report.
//!
//! The crate has two surfaces:
//! - [`SamplePipeline`] runs one recording through cleanup, noise
//!   suppression, voice-activity segmentation, per-segment acoustic
//!   analysis and scoring, and persists every artifact under a per-run
//!   directory.
//! - [`SpeakerRegistry`] maps speaker names to validated sample files in a
//!   single write-through JSON document, with a startup self-healing pass
//!   for dangling sample paths.
//!
//! Everything else (HTTP surface, downloads, playback, the synthesis and
//! transcription models) lives in the embedding service and consumes these
//! two types.

pub mod audio;
pub mod dsp;
pub mod error;
pub mod registry;
pub mod services;
pub mod types;

pub use audio::{write_wav, AudioClip, AudioLoader};
pub use error::{ProcessingError, ProcessingResult, RegistryError, RegistryResult};
pub use registry::{RepairReport, SpeakerProfile, SpeakerRegistry};
pub use services::{ProcessingProfile, SamplePipeline};
pub use types::{
    AcousticMetrics, QualityAssessment, QualityRating, SampleProcessingResult, VoiceType,
};
