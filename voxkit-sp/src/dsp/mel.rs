//! Mel filterbank and MFCC extraction
//!
//! 40 triangular filters on the HTK mel scale, log mel energies, and an
//! orthonormal DCT-II reduced to the first 13 coefficients. Used only for
//! the per-coefficient mean/std voice-character summary.

use crate::dsp::spectral::Spectrogram;

const LOG_FLOOR: f32 = 1e-10;

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank over half-spectrum bins
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    /// One weight row per filter, each `n_fft / 2 + 1` long
    filters: Vec<Vec<f32>>,
}

impl MelFilterbank {
    /// Build `n_mels` filters spanning 0 Hz to Nyquist
    pub fn new(n_mels: usize, n_fft: usize, sample_rate: u32) -> Self {
        let n_bins = n_fft / 2 + 1;
        let nyquist = sample_rate as f32 / 2.0;

        let mel_hi = hz_to_mel(nyquist);
        let band_points: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_hi * i as f32 / (n_mels + 1) as f32))
            .collect();

        let bin_step = sample_rate as f32 / n_fft as f32;
        let mut filters = Vec::with_capacity(n_mels);
        for m in 1..=n_mels {
            let f_left = band_points[m - 1];
            let f_center = band_points[m];
            let f_right = band_points[m + 1];

            let mut weights = vec![0.0f32; n_bins];
            for (bin, w) in weights.iter_mut().enumerate() {
                let f = bin as f32 * bin_step;
                if f <= f_left || f >= f_right {
                    continue;
                }
                let rising = (f - f_left) / (f_center - f_left).max(LOG_FLOOR);
                let falling = (f_right - f) / (f_right - f_center).max(LOG_FLOOR);
                *w = rising.min(falling).max(0.0);
            }
            filters.push(weights);
        }

        Self { filters }
    }

    pub fn n_filters(&self) -> usize {
        self.filters.len()
    }

    /// Mel-band energies of one magnitude frame (power-summed)
    pub fn apply(&self, mags: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|weights| {
                weights
                    .iter()
                    .zip(mags)
                    .map(|(w, m)| w * m * m)
                    .sum::<f32>()
            })
            .collect()
    }
}

/// Orthonormal DCT-II, truncated to `n_coeffs`
fn dct_ii(input: &[f32], n_coeffs: usize) -> Vec<f32> {
    let n = input.len();
    if n == 0 {
        return vec![0.0; n_coeffs];
    }
    let mut output = Vec::with_capacity(n_coeffs);
    for k in 0..n_coeffs {
        let mut sum = 0.0f32;
        for (i, &x) in input.iter().enumerate() {
            let angle = std::f32::consts::PI * k as f32 * (2.0 * i as f32 + 1.0) / (2.0 * n as f32);
            sum += x * angle.cos();
        }
        let scale = if k == 0 {
            (1.0 / n as f32).sqrt()
        } else {
            (2.0 / n as f32).sqrt()
        };
        output.push(sum * scale);
    }
    output
}

/// Per-frame MFCC vectors of a spectrogram
///
/// Returns one `n_coeffs`-long vector per frame; empty input yields no
/// frames.
pub fn mfcc_frames(
    spectrogram: &Spectrogram,
    n_mels: usize,
    n_coeffs: usize,
) -> Vec<Vec<f32>> {
    if spectrogram.frames.is_empty() {
        return Vec::new();
    }
    let bank = MelFilterbank::new(n_mels, spectrogram.n_fft, spectrogram.sample_rate);

    spectrogram
        .frames
        .iter()
        .map(|mags| {
            let mel_energies = bank.apply(mags);
            let log_mel: Vec<f32> = mel_energies
                .iter()
                .map(|&e| (e + LOG_FLOOR).ln())
                .collect();
            dct_ii(&log_mel, n_coeffs)
        })
        .collect()
}
