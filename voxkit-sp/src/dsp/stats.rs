//! Descriptive statistics over sample buffers
//!
//! Accumulation runs in f64 so long buffers do not lose precision; inputs
//! and results stay f32 like the rest of the signal path. Empty input
//! returns 0.0 everywhere, matching the "zero metrics are a valid result"
//! contract of the analyzer.

/// Arithmetic mean
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    (sum / values.len() as f64) as f32
}

/// Population standard deviation
pub fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values) as f64;
    let var: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt() as f32
}

/// Minimum value, 0.0 for empty input
pub fn min(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().copied().fold(f32::INFINITY, f32::min)
    }
}

/// Maximum value, 0.0 for empty input
pub fn max(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Percentile with linear interpolation between ranks
///
/// `p` is in [0, 100]. Values are copied and sorted internally.
pub fn percentile(values: &[f32], p: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f32> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let p = p.clamp(0.0, 100.0);
    let rank = (p / 100.0) as f64 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = (rank - lower as f64) as f32;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Median (50th percentile)
pub fn median(values: &[f32]) -> f32 {
    percentile(values, 50.0)
}

/// Framed RMS energy
///
/// Frames start every `hop` samples and span `frame_len` samples; a trailing
/// partial frame is dropped. Input shorter than one frame yields a single
/// RMS value over the whole buffer.
pub fn frame_rms(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f32> {
    if samples.is_empty() || frame_len == 0 || hop == 0 {
        return Vec::new();
    }
    if samples.len() < frame_len {
        return vec![rms(samples)];
    }

    let mut energies = Vec::with_capacity((samples.len() - frame_len) / hop + 1);
    let mut start = 0;
    while start + frame_len <= samples.len() {
        energies.push(rms(&samples[start..start + frame_len]));
        start += hop;
    }
    energies
}

/// RMS of one buffer
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}
