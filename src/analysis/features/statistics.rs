// Statistics module - Summary statistics of the flattened mel spectrogram
//
// All statistics operate on the mel spectrogram flattened frame-major into a
// single value set. Accumulation is done in f64; results are narrowed to f32.
// Empty input yields all zeros.

use super::spectral::shannon_entropy;

/// Sixteen summary statistics in feature-vector order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MelStatistics {
    pub mean: f32,
    /// Population standard deviation
    pub std: f32,
    pub min: f32,
    pub max: f32,
    pub median: f32,
    pub q25: f32,
    pub q75: f32,
    pub skewness: f32,
    /// Excess kurtosis (normal distribution → 0)
    pub kurtosis: f32,
    pub energy: f32,
    pub entropy: f32,
    pub rms: f32,
    pub peak: f32,
    pub crest_factor: f32,
    /// Least-squares slope of value against flattened index
    pub spectral_slope: f32,
    pub harmonic_mean: f32,
}

impl MelStatistics {
    pub const COUNT: usize = 16;

    pub fn compute(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;

        let (mut m2, mut m3, mut m4) = (0.0f64, 0.0f64, 0.0f64);
        for &v in values {
            let d = v as f64 - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        let variance = m2 / n;
        let std = variance.sqrt();
        let (skewness, kurtosis) = if std > 0.0 {
            ((m3 / n) / std.powi(3), (m4 / n) / (variance * variance) - 3.0)
        } else {
            (0.0, 0.0)
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let energy: f64 = values.iter().map(|&v| v as f64 * v as f64).sum();
        let rms = (energy / n).sqrt();
        let peak = values.iter().fold(0.0f32, |peak, &v| peak.max(v.abs()));
        let crest_factor = if rms > 0.0 { peak as f64 / rms } else { 0.0 };

        Self {
            mean: mean as f32,
            std: std as f32,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median: median(&sorted),
            q25: quantile(&sorted, 0.25),
            q75: quantile(&sorted, 0.75),
            skewness: skewness as f32,
            kurtosis: kurtosis as f32,
            energy: energy as f32,
            entropy: shannon_entropy(values.iter().map(|&v| v as f64)),
            rms: rms as f32,
            peak,
            crest_factor: crest_factor as f32,
            spectral_slope: slope(values),
            harmonic_mean: harmonic_mean(values),
        }
    }

    /// Values in feature-vector order
    pub fn to_array(&self) -> [f32; Self::COUNT] {
        [
            self.mean,
            self.std,
            self.min,
            self.max,
            self.median,
            self.q25,
            self.q75,
            self.skewness,
            self.kurtosis,
            self.energy,
            self.entropy,
            self.rms,
            self.peak,
            self.crest_factor,
            self.spectral_slope,
            self.harmonic_mean,
        ]
    }
}

/// Middle value; mean of the two middle values for even counts
fn median(sorted: &[f32]) -> f32 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        ((sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0) as f32
    }
}

/// Nearest-rank quantile at index floor(q·(n−1)), no interpolation
fn quantile(sorted: &[f32], q: f64) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = (q * (sorted.len() - 1) as f64).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

fn slope(values: &[f32]) -> f32 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = values.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let (mut covariance, mut variance_x) = (0.0f64, 0.0f64);
    for (i, &v) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        covariance += dx * (v as f64 - mean_y);
        variance_x += dx * dx;
    }
    if variance_x <= 0.0 {
        0.0
    } else {
        (covariance / variance_x) as f32
    }
}

/// Harmonic mean of the non-zero entries
fn harmonic_mean(values: &[f32]) -> f32 {
    let (count, reciprocal_sum) = values
        .iter()
        .filter(|&&v| v != 0.0)
        .fold((0usize, 0.0f64), |(count, sum), &v| (count + 1, sum + 1.0 / v as f64));
    if reciprocal_sum == 0.0 {
        0.0
    } else {
        (count as f64 / reciprocal_sum) as f32
    }
}
