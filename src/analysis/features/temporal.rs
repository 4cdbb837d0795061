// Temporal module - Time-domain descriptors
//
// Descriptors computed directly from the waveform: energy measures,
// zero-crossing rate and the autocorrelation pitch estimate. Empty or silent
// input returns 0.0 for every descriptor.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use super::fft::frame_count;
use super::spectral::shannon_entropy;
use crate::analysis::preprocess::peak_amplitude;

/// Temporal feature computation functions
pub struct TemporalFeatures {
    sample_rate: u32,
}

impl TemporalFeatures {
    /// Create a new temporal features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Root-mean-square amplitude: sqrt(mean(x²))
    pub fn compute_rms(&self, audio: &[f32]) -> f32 {
        if audio.is_empty() {
            return 0.0;
        }
        let energy: f64 = audio.iter().map(|&x| x as f64 * x as f64).sum();
        (energy / audio.len() as f64).sqrt() as f32
    }

    /// Largest absolute sample value
    pub fn compute_peak(&self, audio: &[f32]) -> f32 {
        peak_amplitude(audio)
    }

    /// Dynamic range in dB: 20·log10(peak / rms), 0 when rms ≤ 0
    pub fn compute_dynamic_range(&self, peak: f32, rms: f32) -> f32 {
        if rms <= 0.0 || peak <= 0.0 {
            return 0.0;
        }
        20.0 * (peak / rms).log10()
    }

    /// Energy entropy
    ///
    /// Splits the waveform into `frame_size` frames advancing by `hop_size`,
    /// normalizes the per-frame energies to sum to 1 and returns their base-2
    /// Shannon entropy. A waveform shorter than one frame is treated as a
    /// single frame (entropy 0).
    pub fn compute_energy_entropy(&self, audio: &[f32], frame_size: usize, hop_size: usize) -> f32 {
        let energies: Vec<f64> = match frame_count(audio.len(), frame_size, hop_size) {
            0 => vec![audio.iter().map(|&x| x as f64 * x as f64).sum()],
            n => (0..n)
                .map(|i| {
                    audio[i * hop_size..i * hop_size + frame_size]
                        .iter()
                        .map(|&x| x as f64 * x as f64)
                        .sum()
                })
                .collect(),
        };

        let total: f64 = energies.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        shannon_entropy(energies.iter().map(|&e| e / total))
    }

    /// Compute zero-crossing rate (ZCR)
    ///
    /// Counts adjacent pairs whose sign differs, with `x >= 0` on one side
    /// and `x < 0` on the other, normalized by the number of pairs.
    ///
    /// # Returns
    /// Zero-crossing rate (0.0 to 1.0)
    pub fn compute_zcr(&self, audio: &[f32]) -> f32 {
        if audio.len() < 2 {
            return 0.0;
        }

        let crossings = audio
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();

        crossings as f32 / (audio.len() - 1) as f32
    }

    /// Fundamental frequency via autocorrelation
    ///
    /// Searches lags covering `max_hz` down to `min_hz` (clamped to the
    /// waveform length) for the largest raw autocorrelation
    /// r(lag) = Σ x[i]·x[i+lag] and returns sample_rate / best_lag.
    /// Returns 0 for empty input, when no lag fits, or when no lag has a
    /// positive correlation (silence).
    pub fn compute_fundamental_frequency(&self, audio: &[f32], min_hz: f32, max_hz: f32) -> f32 {
        if audio.is_empty() || min_hz <= 0.0 || max_hz <= 0.0 {
            return 0.0;
        }

        let sample_rate = self.sample_rate as f32;
        let min_lag = ((sample_rate / max_hz).floor() as usize).max(1);
        let max_lag = ((sample_rate / min_hz).floor() as usize).min(audio.len() - 1);
        if min_lag > max_lag {
            return 0.0;
        }

        let mut best_lag = 0usize;
        let mut best_correlation = 0.0f64;
        for lag in min_lag..=max_lag {
            let correlation: f64 = audio
                .iter()
                .zip(&audio[lag..])
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum();
            if correlation > best_correlation {
                best_correlation = correlation;
                best_lag = lag;
            }
        }

        if best_lag == 0 {
            0.0
        } else {
            sample_rate / best_lag as f32
        }
    }
}
