//! Audio file decoding
//!
//! PCM extraction via symphonia: probe the container, decode the default
//! audio track, normalize every sample format to f32, average channels down
//! to mono, and resample to the working rate with rubato.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::debug;

use crate::audio::AudioClip;
use crate::error::{ProcessingError, ProcessingResult};

/// Decodes audio containers into mono f32 PCM at a fixed working rate
pub struct AudioLoader {
    /// Target sample rate for output PCM
    target_sample_rate: u32,
}

impl Default for AudioLoader {
    fn default() -> Self {
        Self {
            target_sample_rate: voxkit_common::params::TARGET_SAMPLE_RATE,
        }
    }
}

impl AudioLoader {
    /// Create new audio loader with target sample rate
    pub fn new(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    /// Decode an entire audio file to a mono clip at the target rate
    ///
    /// # Arguments
    /// * `file_path` - Path to audio file (WAV, FLAC, MP3, AAC, etc.)
    ///
    /// # Returns
    /// * `Ok(AudioClip)` - Mono PCM at the loader's target sample rate
    /// * `Err(ProcessingError::UnreadableAudio)` - Open, probe, or decode
    ///   failure
    pub fn load<P: AsRef<Path>>(&self, file_path: P) -> ProcessingResult<AudioClip> {
        let path = file_path.as_ref();
        debug!("Loading audio file: {}", path.display());

        let file = std::fs::File::open(path).map_err(|e| {
            ProcessingError::UnreadableAudio(format!(
                "Failed to open audio file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension() {
            hint.with_extension(ext.to_str().unwrap_or(""));
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                ProcessingError::UnreadableAudio(format!("Failed to probe audio format: {}", e))
            })?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                ProcessingError::UnreadableAudio("No audio tracks found in file".to_string())
            })?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let native_sample_rate = codec_params.sample_rate.ok_or_else(|| {
            ProcessingError::UnreadableAudio("Sample rate not specified in codec params".to_string())
        })?;

        debug!(
            "Native sample rate: {} Hz, Target: {} Hz",
            native_sample_rate, self.target_sample_rate
        );

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| {
                ProcessingError::UnreadableAudio(format!("Failed to create decoder: {}", e))
            })?;

        let mut mono_samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(ProcessingError::UnreadableAudio(format!(
                        "Failed to read packet: {}",
                        e
                    )))
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = decoder.decode(&packet).map_err(|e| {
                ProcessingError::UnreadableAudio(format!("Failed to decode packet: {}", e))
            })?;

            append_mono(decoded, &mut mono_samples);
        }

        debug!(
            "Decoded {} mono samples ({:.2}s at {} Hz)",
            mono_samples.len(),
            mono_samples.len() as f32 / native_sample_rate as f32,
            native_sample_rate
        );

        let final_samples = if native_sample_rate != self.target_sample_rate {
            self.resample_mono(mono_samples, native_sample_rate)?
        } else {
            mono_samples
        };

        Ok(AudioClip::new(final_samples, self.target_sample_rate))
    }

    /// Resample mono PCM to the target sample rate
    ///
    /// Sinc interpolation, 256-tap BlackmanHarris2 window, 0.95 cutoff to
    /// prevent aliasing. Chunk size equals the input length for single-pass
    /// processing.
    fn resample_mono(&self, samples: Vec<f32>, source_rate: u32) -> ProcessingResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(samples);
        }

        let num_frames = samples.len();
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let resample_ratio = self.target_sample_rate as f64 / source_rate as f64;

        let mut resampler = SincFixedIn::<f32>::new(resample_ratio, 2.0, params, num_frames, 1)
            .map_err(|e| {
                ProcessingError::UnreadableAudio(format!("Failed to create resampler: {}", e))
            })?;

        let input_channels = vec![samples];
        let output_channels = resampler.process(&input_channels, None).map_err(|e| {
            ProcessingError::UnreadableAudio(format!("Resampling failed: {}", e))
        })?;

        let output = output_channels.into_iter().next().unwrap_or_default();

        debug!(
            "Resampled {} frames ({} Hz) -> {} frames ({} Hz)",
            num_frames,
            source_rate,
            output.len(),
            self.target_sample_rate
        );

        Ok(output)
    }
}

// ============================================================================
// Sample Format Conversion
// ============================================================================

/// Append a decoded buffer to the output, averaging all channels to mono
fn append_mono(decoded: AudioBufferRef<'_>, output: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => downmix(&*buf, output, |v| v),
        AudioBufferRef::F64(buf) => downmix(&*buf, output, |v| v as f32),
        AudioBufferRef::U8(buf) => downmix(&*buf, output, |v| (v as f32 - 128.0) / 128.0),
        AudioBufferRef::U16(buf) => downmix(&*buf, output, |v| (v as f32 - 32768.0) / 32768.0),
        AudioBufferRef::U24(buf) => {
            downmix(&*buf, output, |v| (v.inner() as f32 - 8388608.0) / 8388608.0)
        }
        AudioBufferRef::U32(buf) => {
            downmix(&*buf, output, |v| (v as f32 - 2147483648.0) / 2147483648.0)
        }
        AudioBufferRef::S8(buf) => downmix(&*buf, output, |v| v as f32 / 128.0),
        AudioBufferRef::S16(buf) => downmix(&*buf, output, |v| v as f32 / 32768.0),
        AudioBufferRef::S24(buf) => downmix(&*buf, output, |v| v.inner() as f32 / 8388608.0),
        AudioBufferRef::S32(buf) => downmix(&*buf, output, |v| v as f32 / 2147483648.0),
    }
}

/// Average all channels of a planar buffer into mono f32
fn downmix<S, F>(buf: &AudioBuffer<S>, output: &mut Vec<f32>, convert: F)
where
    S: Sample + Copy,
    F: Fn(S) -> f32,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    output.reserve(frames);

    if channels == 1 {
        let chan = buf.chan(0);
        for &sample in chan.iter().take(frames) {
            output.push(convert(sample));
        }
        return;
    }

    for i in 0..frames {
        let mut acc = 0.0f32;
        for ch in 0..channels {
            acc += convert(buf.chan(ch)[i]);
        }
        output.push(acc / channels as f32);
    }
}
