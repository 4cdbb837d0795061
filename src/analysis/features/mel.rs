// Mel module - Mel filter bank, log-mel and MFCC
//
// Filter bank: n_mels triangular filters over n_fft/2 + 1 linear bins with
// centers equally spaced on the mel scale between 0 Hz and Nyquist.
//
// The bank keeps the full n_fft/2 + 1 columns, but a power spectrogram frame
// carries only n_fft/2 bins. When applying the bank the top (Nyquist) column
// is dropped, i.e. the spectrogram is treated as zero-padded there.

use super::types::{MelSpectrogram, Spectrogram, N_MFCC};

/// Floor applied before taking log10 of mel energies
const LOG_FLOOR: f32 = 1e-10;

pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filter bank, n_mels × (n_fft/2 + 1)
#[derive(Debug, Clone)]
pub struct MelFilterBank {
    weights: Vec<Vec<f32>>,
    /// (left, center, right) edge frequencies of each filter in Hz
    edges_hz: Vec<(f32, f32, f32)>,
}

impl MelFilterBank {
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let nyquist = sample_rate as f32 / 2.0;
        let mel_max = hz_to_mel(nyquist);
        let hz_points: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
            .collect();

        let n_columns = n_fft / 2 + 1;
        let bin_hz = sample_rate as f32 / n_fft as f32;

        let mut weights = Vec::with_capacity(n_mels);
        let mut edges_hz = Vec::with_capacity(n_mels);
        for points in hz_points.windows(3) {
            let (left, center, right) = (points[0], points[1], points[2]);
            let row = (0..n_columns)
                .map(|k| triangle_weight(k as f32 * bin_hz, left, center, right))
                .collect();
            weights.push(row);
            edges_hz.push((left, center, right));
        }

        Self { weights, edges_hz }
    }

    pub fn n_mels(&self) -> usize {
        self.weights.len()
    }

    /// Rows of filter weights, one per mel band
    pub fn weights(&self) -> &[Vec<f32>] {
        &self.weights
    }

    pub fn edges_hz(&self) -> &[(f32, f32, f32)] {
        &self.edges_hz
    }

    /// Mel energies of one power-spectrum frame
    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .map(|row| {
                // zip stops at the shorter side, dropping the Nyquist column
                row.iter()
                    .zip(power)
                    .map(|(&w, &p)| w as f64 * p as f64)
                    .sum::<f64>() as f32
            })
            .collect()
    }

    /// Apply the bank to every spectrogram frame
    pub fn mel_spectrogram(&self, spectrogram: &Spectrogram) -> MelSpectrogram {
        let frames = spectrogram
            .frames()
            .iter()
            .map(|frame| self.apply(frame))
            .collect();
        MelSpectrogram::from_frames(frames, self.n_mels())
    }
}

fn triangle_weight(freq: f32, left: f32, center: f32, right: f32) -> f32 {
    if freq >= left && freq <= center && center > left {
        (freq - left) / (center - left)
    } else if freq > center && freq <= right && right > center {
        (right - freq) / (right - center)
    } else {
        0.0
    }
}

/// `log10(max(v, 1e-10))` elementwise
pub fn log_mel(frame: &[f32]) -> Vec<f32> {
    frame.iter().map(|&v| v.max(LOG_FLOOR).log10()).collect()
}

/// Orthonormal DCT-II, first `n_coefficients` outputs
///
/// `out[k] = sqrt(2/N) · Σ x[n] · cos(π·k·(2n+1) / (2N))`, with `out[0]`
/// additionally scaled by `1/sqrt(2)`.
pub fn dct_ii(input: &[f32], n_coefficients: usize) -> Vec<f32> {
    let n = input.len();
    if n == 0 {
        return vec![0.0; n_coefficients];
    }
    let scale = (2.0 / n as f64).sqrt();
    (0..n_coefficients)
        .map(|k| {
            let sum: f64 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| {
                    let angle =
                        std::f64::consts::PI * k as f64 * (2 * i + 1) as f64 / (2 * n) as f64;
                    x as f64 * angle.cos()
                })
                .sum();
            let coefficient = scale * sum;
            if k == 0 {
                (coefficient * std::f64::consts::FRAC_1_SQRT_2) as f32
            } else {
                coefficient as f32
            }
        })
        .collect()
}

/// Mean of each of the first 13 MFCCs across all frames
///
/// Zeros when the mel spectrogram has no frames.
pub fn mean_mfcc(mel: &MelSpectrogram) -> [f32; N_MFCC] {
    let mut sums = [0.0f64; N_MFCC];
    if mel.is_empty() {
        return [0.0; N_MFCC];
    }
    for frame in mel.frames() {
        let coefficients = dct_ii(&log_mel(frame), N_MFCC);
        for (sum, c) in sums.iter_mut().zip(coefficients) {
            *sum += c as f64;
        }
    }
    let n_frames = mel.n_frames() as f64;
    sums.map(|sum| (sum / n_frames) as f32)
}
