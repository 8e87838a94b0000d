//! FFT-based spectral analysis
//!
//! Short-time magnitude spectrograms plus the per-frame descriptors built on
//! them (centroid, rolloff, bandwidth, flatness, contrast) and sinusoidal
//! peak tracking for pitch estimation. Full-signal transforms for the noise
//! suppressor live here too.

use rustfft::{num_complex::Complex, FftPlanner};

/// Floor for ratios and logarithms over near-zero spectra
const EPS: f32 = 1e-10;

// ============================================================================
// Transforms
// ============================================================================

/// Periodic Hann window of the given length
pub fn hann_window(len: usize) -> Vec<f32> {
    if len == 0 {
        return Vec::new();
    }
    (0..len)
        .map(|n| {
            let phase = 2.0 * std::f32::consts::PI * n as f32 / len as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Forward FFT of a real signal, any length
pub fn forward_fft(samples: &[f32]) -> Vec<Complex<f32>> {
    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .map(|&s| Complex::new(s, 0.0))
        .collect();
    if buffer.is_empty() {
        return buffer;
    }
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}

/// Inverse FFT returning the real part, normalized by 1/N
pub fn inverse_fft(spectrum: &mut [Complex<f32>]) -> Vec<f32> {
    if spectrum.is_empty() {
        return Vec::new();
    }
    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(spectrum.len());
    ifft.process(spectrum);
    let scale = 1.0 / spectrum.len() as f32;
    spectrum.iter().map(|c| c.re * scale).collect()
}

// ============================================================================
// Spectrogram
// ============================================================================

/// Short-time magnitude spectrogram
///
/// Each frame holds `n_fft / 2 + 1` magnitude bins (real-signal half
/// spectrum). Frames are Hann-windowed and non-centered; input shorter than
/// one frame is zero-padded into a single frame.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Per-frame magnitude bins
    pub frames: Vec<Vec<f32>>,
    pub n_fft: usize,
    pub hop: usize,
    pub sample_rate: u32,
}

impl Spectrogram {
    /// Number of magnitude bins per frame
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Center frequency of one bin in Hz
    pub fn bin_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.n_fft as f32
    }

    /// Center frequencies of all bins
    pub fn bin_frequencies(&self) -> Vec<f32> {
        (0..self.n_bins()).map(|b| self.bin_hz(b)).collect()
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f32 {
        self.sample_rate as f32 / self.hop as f32
    }
}

/// Compute a magnitude spectrogram
pub fn stft(samples: &[f32], n_fft: usize, hop: usize, sample_rate: u32) -> Spectrogram {
    let window = hann_window(n_fft);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);
    let n_bins = n_fft / 2 + 1;

    let mut frames = Vec::new();
    if samples.is_empty() || n_fft == 0 || hop == 0 {
        return Spectrogram {
            frames,
            n_fft,
            hop,
            sample_rate,
        };
    }

    let mut buffer = vec![Complex::new(0.0f32, 0.0f32); n_fft];
    let mut analyze_frame = |start: usize, frames: &mut Vec<Vec<f32>>| {
        for (i, slot) in buffer.iter_mut().enumerate() {
            let sample = samples.get(start + i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * window[i], 0.0);
        }
        fft.process(&mut buffer);
        frames.push(buffer.iter().take(n_bins).map(|c| c.norm()).collect());
    };

    if samples.len() < n_fft {
        // Single zero-padded frame for clips shorter than one window
        analyze_frame(0, &mut frames);
    } else {
        let mut start = 0;
        while start + n_fft <= samples.len() {
            analyze_frame(start, &mut frames);
            start += hop;
        }
    }

    Spectrogram {
        frames,
        n_fft,
        hop,
        sample_rate,
    }
}

// ============================================================================
// Per-frame descriptors
// ============================================================================

/// Magnitude-weighted mean frequency
pub fn centroid(mags: &[f32], freqs: &[f32]) -> f32 {
    let total: f32 = mags.iter().sum();
    if total <= EPS {
        return 0.0;
    }
    let weighted: f32 = mags.iter().zip(freqs).map(|(m, f)| m * f).sum();
    weighted / total
}

/// Frequency below which `fraction` of the total magnitude lies
pub fn rolloff(mags: &[f32], freqs: &[f32], fraction: f32) -> f32 {
    let total: f32 = mags.iter().sum();
    if total <= EPS {
        return 0.0;
    }
    let target = total * fraction;
    let mut cumulative = 0.0;
    for (m, f) in mags.iter().zip(freqs) {
        cumulative += m;
        if cumulative >= target {
            return *f;
        }
    }
    freqs.last().copied().unwrap_or(0.0)
}

/// Magnitude-weighted standard deviation around the centroid
pub fn bandwidth(mags: &[f32], freqs: &[f32], centroid_hz: f32) -> f32 {
    let total: f32 = mags.iter().sum();
    if total <= EPS {
        return 0.0;
    }
    let weighted: f32 = mags
        .iter()
        .zip(freqs)
        .map(|(m, f)| {
            let d = f - centroid_hz;
            m * d * d
        })
        .sum();
    (weighted / total).sqrt()
}

/// Geometric-to-arithmetic mean ratio of the power spectrum
///
/// 1.0 for white noise, near 0 for a pure tone.
pub fn flatness(mags: &[f32]) -> f32 {
    if mags.is_empty() {
        return 0.0;
    }
    let mut log_sum = 0.0f64;
    let mut sum = 0.0f64;
    for &m in mags {
        let power = (m * m).max(EPS) as f64;
        log_sum += power.ln();
        sum += power;
    }
    let n = mags.len() as f64;
    let geometric = (log_sum / n).exp();
    let arithmetic = sum / n;
    if arithmetic <= EPS as f64 {
        return 0.0;
    }
    (geometric / arithmetic) as f32
}

/// Octave band edges for spectral contrast, starting at 200 Hz
///
/// Returns bin index ranges [lo, hi) covering 0-200, 200-400, 400-800, ...
/// up to Nyquist. Empty bands are skipped.
pub fn contrast_bands(n_bins: usize, n_fft: usize, sample_rate: u32) -> Vec<(usize, usize)> {
    let bin_step = sample_rate as f32 / n_fft as f32;
    let nyquist = sample_rate as f32 / 2.0;

    let mut edges = vec![0.0f32, 200.0];
    while let Some(&last) = edges.last() {
        if last >= nyquist {
            break;
        }
        edges.push((last * 2.0).min(nyquist));
    }

    let mut bands = Vec::new();
    for pair in edges.windows(2) {
        let lo = (pair[0] / bin_step).floor() as usize;
        let hi = ((pair[1] / bin_step).floor() as usize).min(n_bins);
        if hi > lo {
            bands.push((lo, hi));
        }
    }
    bands
}

/// Mean peak-to-valley contrast across octave bands, in dB
///
/// Within each band the top and bottom 2% of magnitudes (at least one bin
/// each) form the peak and valley estimates.
pub fn contrast(mags: &[f32], bands: &[(usize, usize)]) -> f32 {
    if bands.is_empty() {
        return 0.0;
    }
    let quantile = 0.02f32;

    let mut total = 0.0f32;
    let mut counted = 0usize;
    for &(lo, hi) in bands {
        let band = &mags[lo..hi.min(mags.len())];
        if band.is_empty() {
            continue;
        }
        let mut sorted: Vec<f32> = band.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let idx = ((quantile * sorted.len() as f32) as usize).max(1);
        let valley: f32 = sorted[..idx].iter().sum::<f32>() / idx as f32;
        let peak: f32 = sorted[sorted.len() - idx..].iter().sum::<f32>() / idx as f32;

        total += 10.0 * ((peak + EPS) / (valley + EPS)).log10();
        counted += 1;
    }

    if counted == 0 {
        0.0
    } else {
        total / counted as f32
    }
}

// ============================================================================
// Pitch peak tracking
// ============================================================================

/// One sinusoidal peak observation
#[derive(Debug, Clone, Copy)]
pub struct PitchObservation {
    /// Interpolated peak frequency in Hz
    pub hz: f32,
    /// Interpolated peak magnitude
    pub magnitude: f32,
}

/// Collect sinusoidal peaks in a frequency band across all frames
///
/// A peak is a bin strictly above its left neighbor and at least its right
/// neighbor; its frequency and magnitude are refined by parabolic
/// interpolation over the three bins. Every local peak in the band is kept;
/// magnitude filtering is the caller's policy.
pub fn pitch_peaks(spectrogram: &Spectrogram, fmin: f32, fmax: f32) -> Vec<PitchObservation> {
    let bin_step = spectrogram.sample_rate as f32 / spectrogram.n_fft as f32;
    if bin_step <= 0.0 {
        return Vec::new();
    }
    let lo_bin = ((fmin / bin_step).ceil() as usize).max(1);
    let hi_bin = (fmax / bin_step).floor() as usize;

    let mut observations = Vec::new();
    for mags in &spectrogram.frames {
        let hi = hi_bin.min(mags.len().saturating_sub(2));
        if lo_bin > hi {
            continue;
        }
        for bin in lo_bin..=hi {
            let left = mags[bin - 1];
            let center = mags[bin];
            let right = mags[bin + 1];
            if center <= left || center < right {
                continue;
            }

            // Parabolic interpolation around the peak bin
            let denom = left - 2.0 * center + right;
            let delta = if denom.abs() > EPS {
                (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
            } else {
                0.0
            };

            let hz = (bin as f32 + delta) * bin_step;
            let magnitude = center - 0.25 * (left - right) * delta;
            if hz >= fmin && hz <= fmax {
                observations.push(PitchObservation { hz, magnitude });
            }
        }
    }
    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let count = (sample_rate as f32 * seconds) as usize;
        (0..count)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }

    /// Deterministic pseudo-noise from a linear congruential generator
    fn pseudo_noise(count: usize) -> Vec<f32> {
        let mut state = 0x12345678u32;
        (0..count)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                (state >> 8) as f32 / 8388608.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_forward_inverse_round_trip() {
        let samples = sine(440.0, 22050, 0.05);
        let mut spectrum = forward_fft(&samples);
        let reconstructed = inverse_fft(&mut spectrum);

        assert_eq!(reconstructed.len(), samples.len());
        for (a, b) in samples.iter().zip(reconstructed.iter()) {
            assert!((a - b).abs() < 1e-3, "Round trip drifted: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_stft_frame_count_and_bins() {
        let samples = vec![0.0f32; 2048 + 512 * 3];
        let spec = stft(&samples, 2048, 512, 22050);
        assert_eq!(spec.frames.len(), 4);
        assert_eq!(spec.frames[0].len(), 1025);
        assert_eq!(spec.n_bins(), 1025);
    }

    #[test]
    fn test_stft_short_input_zero_padded() {
        let samples = vec![0.1f32; 100];
        let spec = stft(&samples, 2048, 512, 22050);
        assert_eq!(spec.frames.len(), 1);
    }

    #[test]
    fn test_centroid_tracks_tone_frequency() {
        let samples = sine(1000.0, 22050, 0.5);
        let spec = stft(&samples, 2048, 512, 22050);
        let freqs = spec.bin_frequencies();

        let c = centroid(&spec.frames[1], &freqs);
        assert!(
            (c - 1000.0).abs() < 100.0,
            "Centroid of 1 kHz tone was {} Hz",
            c
        );
    }

    #[test]
    fn test_flatness_separates_tone_from_noise() {
        let tone = sine(440.0, 22050, 0.5);
        let tone_spec = stft(&tone, 2048, 512, 22050);
        let tone_flatness = flatness(&tone_spec.frames[1]);

        let noise = pseudo_noise(11025);
        let noise_spec = stft(&noise, 2048, 512, 22050);
        let noise_flatness = flatness(&noise_spec.frames[1]);

        assert!(tone_flatness < 0.1, "Tone flatness: {}", tone_flatness);
        assert!(
            noise_flatness > tone_flatness * 10.0,
            "Noise flatness {} not well above tone {}",
            noise_flatness,
            tone_flatness
        );
    }

    #[test]
    fn test_rolloff_below_nyquist() {
        let samples = pseudo_noise(22050);
        let spec = stft(&samples, 2048, 512, 22050);
        let freqs = spec.bin_frequencies();

        let r = rolloff(&spec.frames[0], &freqs, 0.85);
        assert!(r > 0.0 && r <= 11025.0, "Rolloff out of range: {}", r);
    }

    #[test]
    fn test_bandwidth_narrow_for_tone() {
        let samples = sine(1000.0, 22050, 0.5);
        let spec = stft(&samples, 2048, 512, 22050);
        let freqs = spec.bin_frequencies();

        let c = centroid(&spec.frames[1], &freqs);
        let bw = bandwidth(&spec.frames[1], &freqs, c);
        assert!(bw < 500.0, "Tone bandwidth too wide: {}", bw);
    }

    #[test]
    fn test_contrast_higher_for_tone_than_noise() {
        let sr = 22050;
        let tone = sine(440.0, sr, 0.5);
        let tone_spec = stft(&tone, 2048, 512, sr);
        let bands = contrast_bands(tone_spec.n_bins(), 2048, sr);

        let tone_contrast = contrast(&tone_spec.frames[1], &bands);

        let noise = pseudo_noise(11025);
        let noise_spec = stft(&noise, 2048, 512, sr);
        let noise_contrast = contrast(&noise_spec.frames[1], &bands);

        assert!(
            tone_contrast > noise_contrast,
            "Tone contrast {} should exceed noise contrast {}",
            tone_contrast,
            noise_contrast
        );
    }

    #[test]
    fn test_pitch_peaks_find_tone() {
        let samples = sine(440.0, 22050, 0.5);
        let spec = stft(&samples, 2048, 512, 22050);

        let peaks = pitch_peaks(&spec, 65.0, 2000.0);
        assert!(!peaks.is_empty());

        // The strongest observation should sit at the tone frequency
        let best = peaks
            .iter()
            .max_by(|a, b| a.magnitude.partial_cmp(&b.magnitude).unwrap())
            .unwrap();
        assert!(
            (best.hz - 440.0).abs() < 15.0,
            "Strongest peak at {} Hz, expected ~440",
            best.hz
        );
    }

    #[test]
    fn test_pitch_peaks_respect_band() {
        let samples = sine(3000.0, 22050, 0.5);
        let spec = stft(&samples, 2048, 512, 22050);

        let peaks = pitch_peaks(&spec, 65.0, 2000.0);
        for p in &peaks {
            assert!(p.hz >= 65.0 && p.hz <= 2000.0);
        }
    }

    #[test]
    fn test_empty_spectrogram() {
        let spec = stft(&[], 2048, 512, 22050);
        assert!(spec.frames.is_empty());
        assert!(pitch_peaks(&spec, 65.0, 2000.0).is_empty());
    }
}
