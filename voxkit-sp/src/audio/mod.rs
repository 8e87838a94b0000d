//! Audio ingestion and export
//!
//! All processing operates on mono f32 PCM. Multi-channel input is averaged
//! down to mono at decode time, a lossy and deliberate choice.

pub mod loader;
pub mod writer;

pub use loader::AudioLoader;
pub use writer::write_wav;

/// Mono PCM waveform
///
/// Samples are normalized f32 in [-1.0, 1.0]. Invariant: sample_rate > 0.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Mono samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Copy out the sample range [start, end), clamped to the clip length
    pub fn slice(&self, start: usize, end: usize) -> AudioClip {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        AudioClip {
            samples: self.samples[start..end].to_vec(),
            sample_rate: self.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_duration() {
        let clip = AudioClip::new(vec![0.0; 22050], 22050);
        assert!((clip.duration_seconds() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_slice_clamps_to_length() {
        let clip = AudioClip::new(vec![0.1, 0.2, 0.3, 0.4], 22050);

        let middle = clip.slice(1, 3);
        assert_eq!(middle.samples, vec![0.2, 0.3]);
        assert_eq!(middle.sample_rate, 22050);

        let past_end = clip.slice(2, 100);
        assert_eq!(past_end.samples, vec![0.3, 0.4]);

        let inverted = clip.slice(3, 1);
        assert!(inverted.is_empty());
    }
}
