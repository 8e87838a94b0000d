//! Signal-processing primitives
//!
//! Small, synchronous building blocks shared by the pipeline services:
//! descriptive statistics, FFT-based spectral analysis, mel-cepstral
//! features, and onset-based tempo estimation.

pub mod mel;
pub mod spectral;
pub mod stats;
pub mod tempo;
