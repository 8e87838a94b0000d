//! WAV encoding for processed clips
//!
//! Cleaned audio and exported segments are written as 16-bit PCM mono WAV,
//! the format the synthesis collaborator consumes.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;
use tracing::debug;

use crate::audio::AudioClip;
use crate::error::{ProcessingError, ProcessingResult};

/// Write a mono clip as 16-bit PCM WAV
///
/// Samples are clamped to [-1.0, 1.0] before quantization.
pub fn write_wav<P: AsRef<Path>>(path: P, clip: &AudioClip) -> ProcessingResult<()> {
    let path = path.as_ref();

    let spec = WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| {
        ProcessingError::Persistence(format!("Failed to create {}: {}", path.display(), e))
    })?;

    for &sample in &clip.samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value).map_err(|e| {
            ProcessingError::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })?;
    }

    writer.finalize().map_err(|e| {
        ProcessingError::Persistence(format!("Failed to finalize {}: {}", path.display(), e))
    })?;

    debug!(
        "Wrote {} samples ({:.2}s) to {}",
        clip.len(),
        clip.duration_seconds(),
        path.display()
    );

    Ok(())
}
