// Preprocessing - peak normalization and near-silence trimming
//
// Pure functions over a mono waveform. Trimming keeps the inclusive range
// between the first and last sample whose normalized magnitude exceeds the
// threshold; an all-silent input trims to nothing.

/// Default trim threshold on the peak-normalized magnitude
pub const SILENCE_THRESHOLD: f32 = 0.01;

/// Largest absolute sample value (0 for empty input)
pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |peak, &x| peak.max(x.abs()))
}

/// Divide every sample by the peak magnitude
///
/// Silence (peak 0) is returned unchanged.
pub fn normalize_peak(samples: &[f32]) -> Vec<f32> {
    let peak = peak_amplitude(samples);
    if peak == 0.0 {
        return samples.to_vec();
    }
    samples.iter().map(|&x| x / peak).collect()
}

/// Inclusive index range kept by trimming
///
/// The threshold is compared against |x| / peak, so the range is the same as
/// normalizing first and trimming with an absolute threshold. `None` when no
/// sample exceeds it.
pub fn trim_bounds(samples: &[f32], threshold: f32) -> Option<(usize, usize)> {
    let peak = peak_amplitude(samples);
    if peak == 0.0 {
        return None;
    }
    let is_sound = |x: &f32| x.abs() / peak > threshold;
    let start = samples.iter().position(is_sound)?;
    let end = samples.iter().rposition(is_sound)?;
    Some((start, end))
}

/// Trim leading and trailing samples at or below `threshold` (absolute)
pub fn trim_silence(samples: &[f32], threshold: f32) -> Vec<f32> {
    let is_sound = |x: &f32| x.abs() > threshold;
    match (
        samples.iter().position(is_sound),
        samples.iter().rposition(is_sound),
    ) {
        (Some(start), Some(end)) => samples[start..=end].to_vec(),
        _ => Vec::new(),
    }
}

/// Peak-normalize, then trim with the default 0.01 threshold
///
/// The sample rate does not influence the result; it is part of the
/// signature so every pipeline stage takes the same inputs.
pub fn preprocess(samples: &[f32], _sample_rate: u32) -> Vec<f32> {
    trim_silence(&normalize_peak(samples), SILENCE_THRESHOLD)
}
