// FFT module - Short-time Fourier transform
//
// Hann-windowed framing plus a forward real FFT per frame. Output is the
// unnormalized power spectrum |X[k]|² of the first n_fft/2 bins; descriptors
// downstream assume this scale, so no window-energy normalization is applied.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::types::Spectrogram;

/// Hann window `0.5 * (1 - cos(2πi / (n - 1)))`
pub fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - ((2.0 * std::f32::consts::PI * i as f32) / (size as f32 - 1.0)).cos())
        })
        .collect()
}

/// Number of full frames that fit in `len` samples
pub fn frame_count(len: usize, n_fft: usize, hop: usize) -> usize {
    if len < n_fft || hop == 0 {
        return 0;
    }
    (len - n_fft) / hop + 1
}

/// FFT processor that turns waveforms into power spectra
///
/// The forward plan and Hann window are computed once; per-call scratch
/// buffers are allocated inside each call and shared across its frames.
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Hann window for FFT (pre-computed)
    window: Vec<f32>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// # Arguments
    /// * `fft_size` - FFT window size (2048 for the canonical pipeline)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            fft_size,
            window: hann_window(fft_size),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Short-time power spectrogram
    ///
    /// Frame count = floor((len - n_fft) / hop) + 1; an input shorter than
    /// one window yields an empty spectrogram.
    pub fn stft(&self, samples: &[f32], hop: usize) -> Spectrogram {
        let n_bins = self.fft_size / 2;
        let n_frames = frame_count(samples.len(), self.fft_size, hop);
        if n_frames == 0 {
            return Spectrogram::empty(n_bins);
        }

        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.fft_size];
        let mut scratch = vec![Complex::new(0.0f32, 0.0); self.fft.get_inplace_scratch_len()];
        let mut frames = Vec::with_capacity(n_frames);

        for frame_index in 0..n_frames {
            let start = frame_index * hop;
            let frame = &samples[start..start + self.fft_size];
            for ((slot, &sample), &w) in buffer.iter_mut().zip(frame).zip(&self.window) {
                *slot = Complex::new(sample * w, 0.0);
            }
            self.fft.process_with_scratch(&mut buffer, &mut scratch);
            frames.push(buffer[..n_bins].iter().map(|c| c.norm_sqr()).collect());
        }

        Spectrogram::from_frames(frames, n_bins)
    }

    /// Power spectrum of a single rectangular (unwindowed) frame
    ///
    /// Uses the first `fft_size` samples, zero-padding shorter input.
    /// Returns `fft_size / 2` bins.
    pub fn prefix_power_spectrum(&self, samples: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = samples
            .iter()
            .take(self.fft_size)
            .map(|&sample| Complex::new(sample, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer[..self.fft_size / 2]
            .iter()
            .map(|c| c.norm_sqr())
            .collect()
    }
}
