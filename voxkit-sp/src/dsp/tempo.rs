//! Onset-based tempo estimation
//!
//! A positive spectral-flux onset envelope autocorrelated over a plausible
//! BPM range. The result is a coarse speaking-rhythm scalar, not a musical
//! beat tracker; degenerate envelopes report 0.

use crate::dsp::spectral::Spectrogram;

const EPS: f32 = 1e-10;

/// Positive spectral flux per frame
///
/// Frame t is the sum over bins of max(0, mag[t] - mag[t-1]); the first
/// frame is 0.
pub fn onset_strength(spectrogram: &Spectrogram) -> Vec<f32> {
    let frames = &spectrogram.frames;
    if frames.is_empty() {
        return Vec::new();
    }

    let mut envelope = Vec::with_capacity(frames.len());
    envelope.push(0.0);
    for t in 1..frames.len() {
        let flux: f32 = frames[t]
            .iter()
            .zip(frames[t - 1].iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
        envelope.push(flux);
    }
    envelope
}

/// Estimate tempo in BPM from an onset envelope
///
/// Searches autocorrelation lags corresponding to [min_bpm, max_bpm].
/// Returns 0.0 when the envelope is too short, flat, or shows no positive
/// periodicity.
pub fn estimate_bpm(envelope: &[f32], frame_rate: f32, min_bpm: f32, max_bpm: f32) -> f32 {
    if envelope.len() < 4 || frame_rate <= 0.0 || min_bpm <= 0.0 || max_bpm <= min_bpm {
        return 0.0;
    }

    // Mean-center so a constant envelope autocorrelates to zero
    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    let centered: Vec<f32> = envelope.iter().map(|&v| v - mean).collect();

    let energy: f32 = centered.iter().map(|&v| v * v).sum();
    if energy <= EPS {
        return 0.0;
    }

    let min_lag = ((frame_rate * 60.0 / max_bpm).round() as usize).max(1);
    let max_lag = ((frame_rate * 60.0 / min_bpm).round() as usize).min(centered.len() - 1);
    if min_lag > max_lag {
        return 0.0;
    }

    let mut best_lag = 0usize;
    let mut best_corr = 0.0f32;
    for lag in min_lag..=max_lag {
        let corr: f32 = centered[..centered.len() - lag]
            .iter()
            .zip(&centered[lag..])
            .map(|(a, b)| a * b)
            .sum();
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
    }

    if best_lag == 0 || best_corr <= 0.0 {
        return 0.0;
    }
    frame_rate * 60.0 / best_lag as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::spectral::stft;

    #[test]
    fn test_onset_strength_flags_attack() {
        // Silence then a tone: the attack frame must carry the largest flux
        let sample_rate = 22050u32;
        let mut samples = vec![0.0f32; 11025];
        for i in 0..11025 {
            let t = i as f32 / sample_rate as f32;
            samples.push(0.8 * (2.0 * std::f32::consts::PI * 440.0 * t).sin());
        }
        let spec = stft(&samples, 2048, 512, sample_rate);
        let envelope = onset_strength(&spec);

        assert_eq!(envelope.len(), spec.frames.len());
        assert_eq!(envelope[0], 0.0);

        let peak_idx = envelope
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let attack_frame = 11025 / 512;
        assert!(
            (peak_idx as i64 - attack_frame as i64).abs() <= 2,
            "Peak flux at frame {}, expected near {}",
            peak_idx,
            attack_frame
        );
    }

    #[test]
    fn test_estimate_bpm_of_impulse_train() {
        // 120 BPM = one impulse every 0.5s; frame rate 43.07 at 22050/512
        let frame_rate: f32 = 22050.0 / 512.0;
        let period = (frame_rate * 0.5).round() as usize;
        let mut envelope = vec![0.0f32; period * 12];
        let mut i = 0;
        while i < envelope.len() {
            envelope[i] = 1.0;
            i += period;
        }

        let bpm = estimate_bpm(&envelope, frame_rate, 30.0, 300.0);
        assert!(
            (bpm - 120.0).abs() < 10.0,
            "Estimated {} BPM, expected ~120",
            bpm
        );
    }

    #[test]
    fn test_estimate_bpm_degenerate_is_zero() {
        let frame_rate = 43.0;
        assert_eq!(estimate_bpm(&[], frame_rate, 30.0, 300.0), 0.0);
        assert_eq!(estimate_bpm(&[0.0; 3], frame_rate, 30.0, 300.0), 0.0);
        // Constant envelope has no periodicity after centering
        assert_eq!(estimate_bpm(&[1.0; 500], frame_rate, 30.0, 300.0), 0.0);
    }

    #[test]
    fn test_estimate_bpm_within_bounds() {
        // Noisy envelope still lands inside the search range or 0
        let mut state = 0x2468ace0u32;
        let envelope: Vec<f32> = (0..500)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                (state >> 16) as f32 / 65536.0
            })
            .collect();

        let bpm = estimate_bpm(&envelope, 43.0, 30.0, 300.0);
        assert!(
            bpm == 0.0 || (30.0..=300.0).contains(&bpm),
            "BPM out of bounds: {}",
            bpm
        );
    }
}
