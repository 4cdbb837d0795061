// Spectral module - Frequency-domain descriptors
//
// Every descriptor here consumes the power spectrogram (|X[k]|², n_fft/2 bins
// per frame). Per-frame values are averaged across frames; an empty
// spectrogram or a zero-power frame degrades to 0.0 instead of failing.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use super::types::Spectrogram;

/// Spectral feature computation functions
pub struct SpectralFeatures {
    sample_rate: u32,
    fft_size: usize,
    rolloff_fraction: f32,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fft_size` - FFT window size
    /// * `rolloff_fraction` - Energy fraction defining the rolloff (0.85)
    pub fn new(sample_rate: u32, fft_size: usize, rolloff_fraction: f32) -> Self {
        Self {
            sample_rate,
            fft_size,
            rolloff_fraction,
        }
    }

    fn bin_hz(&self) -> f64 {
        self.sample_rate as f64 / self.fft_size as f64
    }

    /// Per-frame spectral centroid in Hz
    ///
    /// Formula: centroid = Σ(f_k × P[k]) / ΣP[k]; 0 for zero-power frames
    pub fn frame_centroids(&self, spectrogram: &Spectrogram) -> Vec<f32> {
        let bin_hz = self.bin_hz();
        spectrogram
            .frames()
            .iter()
            .map(|frame| {
                let total: f64 = frame.iter().map(|&p| p as f64).sum();
                if total <= 0.0 {
                    return 0.0;
                }
                let weighted: f64 = frame
                    .iter()
                    .enumerate()
                    .map(|(k, &p)| k as f64 * bin_hz * p as f64)
                    .sum();
                (weighted / total) as f32
            })
            .collect()
    }

    /// Spectral bandwidth: power-weighted RMS deviation from each frame's centroid
    pub fn bandwidth(&self, spectrogram: &Spectrogram, centroids: &[f32]) -> f32 {
        let bin_hz = self.bin_hz();
        let per_frame = spectrogram
            .frames()
            .iter()
            .zip(centroids)
            .map(|(frame, &centroid)| {
                let total: f64 = frame.iter().map(|&p| p as f64).sum();
                if total <= 0.0 {
                    return 0.0;
                }
                let spread: f64 = frame
                    .iter()
                    .enumerate()
                    .map(|(k, &p)| {
                        let deviation = k as f64 * bin_hz - centroid as f64;
                        p as f64 * deviation * deviation
                    })
                    .sum();
                (spread / total).sqrt()
            });
        mean(per_frame, spectrogram.n_frames())
    }

    /// Spectral contrast: 20·log10(max / min) per frame, 0 when min ≤ 0
    pub fn contrast(&self, spectrogram: &Spectrogram) -> f32 {
        let per_frame = spectrogram.frames().iter().map(|frame| {
            let max = frame.iter().copied().fold(f32::MIN, f32::max);
            let min = frame.iter().copied().fold(f32::MAX, f32::min);
            if frame.is_empty() || min <= 0.0 {
                0.0
            } else {
                20.0 * (max as f64 / min as f64).log10()
            }
        });
        mean(per_frame, spectrogram.n_frames())
    }

    /// Spectral flatness: geometric mean / arithmetic mean per frame
    ///
    /// Returns a value between 0 (tonal) and 1 (white noise). Zero bins are
    /// floored at 1e-10 inside the logarithm; zero-power frames give 0.
    pub fn flatness(&self, spectrogram: &Spectrogram) -> f32 {
        let per_frame = spectrogram.frames().iter().map(|frame| {
            if frame.is_empty() {
                return 0.0;
            }
            let n = frame.len() as f64;
            let arithmetic_mean = frame.iter().map(|&p| p as f64).sum::<f64>() / n;
            if arithmetic_mean <= 0.0 {
                return 0.0;
            }
            let log_mean = frame
                .iter()
                .map(|&p| (p as f64).max(1e-10).ln())
                .sum::<f64>()
                / n;
            (log_mean.exp() / arithmetic_mean).min(1.0)
        });
        mean(per_frame, spectrogram.n_frames())
    }

    /// Spectral rolloff: frequency where cumulative power first reaches the
    /// rolloff fraction of the frame total
    ///
    /// Zero-power frames are skipped entirely; the mean is taken over the
    /// frames that contributed.
    pub fn rolloff(&self, spectrogram: &Spectrogram) -> f32 {
        let bin_hz = self.bin_hz();
        let mut sum = 0.0f64;
        let mut contributing = 0usize;

        for frame in spectrogram.frames() {
            let total: f64 = frame.iter().map(|&p| p as f64).sum();
            if total <= 0.0 {
                continue;
            }
            let threshold = self.rolloff_fraction as f64 * total;
            let mut cumulative = 0.0f64;
            let mut rolloff_bin = frame.len().saturating_sub(1);
            for (k, &p) in frame.iter().enumerate() {
                cumulative += p as f64;
                if cumulative >= threshold {
                    rolloff_bin = k;
                    break;
                }
            }
            sum += rolloff_bin as f64 * bin_hz;
            contributing += 1;
        }

        if contributing == 0 {
            0.0
        } else {
            (sum / contributing as f64) as f32
        }
    }

    /// Spectral entropy: base-2 Shannon entropy of each frame's normalized
    /// power distribution, averaged; 0 for zero-power frames
    pub fn entropy(&self, spectrogram: &Spectrogram) -> f32 {
        let per_frame = spectrogram.frames().iter().map(|frame| {
            let total: f64 = frame.iter().map(|&p| p as f64).sum();
            if total <= 0.0 {
                return 0.0;
            }
            shannon_entropy(frame.iter().map(|&p| p as f64 / total)) as f64
        });
        mean(per_frame, spectrogram.n_frames())
    }

    /// Mean onset strength over consecutive frame pairs
    ///
    /// Each pair contributes Σ_k max(0, previous[k] − current[k]); fewer than
    /// two frames gives 0.
    pub fn onset_strength_mean(&self, spectrogram: &Spectrogram) -> f32 {
        let frames = spectrogram.frames();
        if frames.len() < 2 {
            return 0.0;
        }
        let per_pair = frames.windows(2).map(|pair| {
            pair[0]
                .iter()
                .zip(&pair[1])
                .map(|(&previous, &current)| (previous as f64 - current as f64).max(0.0))
                .sum::<f64>()
        });
        mean(per_pair, frames.len() - 1)
    }

    /// Ratio of summed power in `low_band` to `high_band` (Hz, `[low, high)`)
    ///
    /// `power` is a single spectrum of `fft_size / 2` bins. Returns 0 when the
    /// denominator band holds no bins or no energy.
    pub fn sub_band_energy_ratio(
        &self,
        power: &[f32],
        low_band: (f32, f32),
        high_band: (f32, f32),
    ) -> f32 {
        let bin_hz = self.bin_hz();
        let band_energy = |(low, high): (f32, f32)| -> f64 {
            power
                .iter()
                .enumerate()
                .filter(|(k, _)| {
                    let freq = *k as f64 * bin_hz;
                    freq >= low as f64 && freq < high as f64
                })
                .map(|(_, &p)| p as f64)
                .sum()
        };

        let denominator = band_energy(high_band);
        if denominator <= 0.0 {
            return 0.0;
        }
        (band_energy(low_band) / denominator) as f32
    }
}

/// Mean of `count` per-frame values; 0 when there are none
fn mean(values: impl Iterator<Item = f64>, count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    (values.sum::<f64>() / count as f64) as f32
}

/// −Σ p·log2(p) over strictly positive probabilities
pub(crate) fn shannon_entropy(probabilities: impl Iterator<Item = f64>) -> f32 {
    -probabilities
        .filter(|&p| p > 0.0)
        .map(|p| p * p.log2())
        .sum::<f64>() as f32
}
