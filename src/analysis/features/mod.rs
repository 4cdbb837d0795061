// FeatureExtractor - acoustic descriptor pipeline for impact sounds
//
// Turns a mono waveform into the fixed 53-slot feature vector used to
// characterize knock/impact recordings. Data flows strictly forward:
// waveform → power spectrogram → mel spectrogram → descriptors → vector.
//
// Module organization:
// - types: Spectrogram containers, slot table, FeatureVector
// - fft: Hann-windowed STFT and single-frame power spectrum
// - mel: Mel filter bank, log-mel, DCT-II, mean MFCCs
// - spectral: Power-spectrum descriptors (centroid, bandwidth, rolloff, ...)
// - temporal: Waveform descriptors (RMS, ZCR, energy entropy, F0)
// - statistics: Mel-spectrogram summary statistics
// - mod.rs: Coordinator (FeatureExtractor) and assembler
//
// Vector layout (see types::FEATURE_SLOTS):
//   0..13   mean MFCCs
//   13..20  spectral descriptors + zero-crossing rate
//   20..24  energy descriptors
//   24..27  rhythm: tempo and beat strength placeholders, onset strength
//   27..35  reserved impact/timbre placeholders (always 0.0)
//   35..51  mel-spectrogram statistics
//   51..53  fundamental frequency, sub-band energy ratio

mod fft;
mod mel;
mod spectral;
mod statistics;
mod temporal;
mod types;

pub use fft::{frame_count, hann_window, FftProcessor};
pub use mel::{dct_ii, hz_to_mel, log_mel, mean_mfcc, mel_to_hz, MelFilterBank};
pub use spectral::SpectralFeatures;
pub use statistics::MelStatistics;
pub use temporal::TemporalFeatures;
pub use types::{
    feature_index, feature_names, FeatureCategory, FeatureSlot, FeatureVector, MelSpectrogram,
    Spectrogram, FEATURE_COUNT, FEATURE_SLOTS, N_MFCC,
};

use std::borrow::Cow;

use log::{debug, warn};

use super::preprocess::{normalize_peak, trim_bounds};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Slots 24..26: tempo and beat strength, not yet implemented
const RHYTHM_PLACEHOLDERS: usize = 2;

/// Slots 27..35: reserved impact/timbre descriptors, not yet implemented
const IMPACT_PLACEHOLDERS: usize = 8;

/// FeatureExtractor coordinates the DSP feature extraction pipeline
///
/// Immutable after construction: the FFT plan, Hann window and mel filter
/// bank are shared by every call, while spectrograms and scratch buffers
/// are created per call. Safe to share across threads behind an `Arc`.
pub struct FeatureExtractor {
    fft_processor: FftProcessor,
    mel_bank: MelFilterBank,
    spectral_features: SpectralFeatures,
    temporal_features: TemporalFeatures,
    sample_rate: u32,
    config: AnalysisConfig,
}

impl FeatureExtractor {
    /// Create an extractor with the default configuration
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz (22050 canonical). A rate of
    ///   0 is accepted but degenerate: `extract` then returns all zeros.
    pub fn new(sample_rate: u32) -> Self {
        Self::build(sample_rate, AnalysisConfig::default())
    }

    /// Create an extractor with explicit, validated configuration
    pub fn with_config(sample_rate: u32, config: AnalysisConfig) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidConfig {
                reason: "sample rate must be greater than 0".to_string(),
            });
        }
        config.validate()?;
        Ok(Self::build(sample_rate, config))
    }

    fn build(sample_rate: u32, config: AnalysisConfig) -> Self {
        let n_fft = config.framing.n_fft;
        Self {
            fft_processor: FftProcessor::new(n_fft),
            mel_bank: MelFilterBank::new(sample_rate, n_fft, config.mel.n_mels),
            spectral_features: SpectralFeatures::new(
                sample_rate,
                n_fft,
                config.descriptors.rolloff_fraction,
            ),
            temporal_features: TemporalFeatures::new(sample_rate),
            sample_rate,
            config,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Waveform after the configured trimming/normalization
    ///
    /// With the default config the trim range is peak-relative but samples
    /// keep their recorded level; set `preprocess.normalize` to rescale.
    pub fn prepare<'a>(&self, audio: &'a [f32]) -> Cow<'a, [f32]> {
        let preprocess = &self.config.preprocess;
        let trimmed: &[f32] = if preprocess.trim {
            match trim_bounds(audio, preprocess.silence_threshold) {
                Some((start, end)) => &audio[start..=end],
                None => &[],
            }
        } else {
            audio
        };

        if preprocess.normalize {
            Cow::Owned(normalize_peak(trimmed))
        } else {
            Cow::Borrowed(trimmed)
        }
    }

    /// Power spectrogram of an already prepared waveform
    pub fn spectrogram(&self, waveform: &[f32]) -> Spectrogram {
        self.fft_processor
            .stft(waveform, self.config.framing.hop_size)
    }

    /// Mel spectrogram of a power spectrogram
    pub fn mel_spectrogram(&self, spectrogram: &Spectrogram) -> MelSpectrogram {
        self.mel_bank.mel_spectrogram(spectrogram)
    }

    /// Extract all features from a recording
    ///
    /// Never fails: empty, silent or too-short input produces zeros in the
    /// affected slots, and a zero sample rate produces an all-zero vector.
    pub fn extract(&self, audio: &[f32]) -> FeatureVector {
        if self.sample_rate == 0 {
            warn!("[FeatureExtractor] Sample rate is 0; returning an all-zero feature vector");
            return FeatureVector::from_values(vec![0.0; FEATURE_COUNT]);
        }

        let waveform = self.prepare(audio);
        let spectrogram = self.spectrogram(&waveform);
        let mel = self.mel_spectrogram(&spectrogram);

        debug!(
            "[FeatureExtractor] {} samples -> {} kept, {} frames x {} bins, {} mel bands",
            audio.len(),
            waveform.len(),
            spectrogram.n_frames(),
            spectrogram.n_bins(),
            mel.n_bins()
        );

        let descriptors = &self.config.descriptors;
        let spectral = &self.spectral_features;
        let temporal = &self.temporal_features;

        // Spectral (13..20)
        let centroids = spectral.frame_centroids(&spectrogram);
        let centroid = mean_of(&centroids);
        let bandwidth = spectral.bandwidth(&spectrogram, &centroids);
        let contrast = spectral.contrast(&spectrogram);
        let flatness = spectral.flatness(&spectrogram);
        let rolloff = spectral.rolloff(&spectrogram);
        let spectral_entropy = spectral.entropy(&spectrogram);
        let zcr = temporal.compute_zcr(&waveform);

        // Energy (20..24)
        let rms = temporal.compute_rms(&waveform);
        let peak = temporal.compute_peak(&waveform);
        let dynamic_range = temporal.compute_dynamic_range(peak, rms);
        let energy_entropy = temporal.compute_energy_entropy(
            &waveform,
            self.config.framing.n_fft,
            self.config.framing.hop_size,
        );

        // Rhythm (26)
        let onset_strength = spectral.onset_strength_mean(&spectrogram);

        // Impact (51..53)
        let f0 = temporal.compute_fundamental_frequency(
            &waveform,
            descriptors.f0_min_hz,
            descriptors.f0_max_hz,
        );
        let prefix_power = self.fft_processor.prefix_power_spectrum(&waveform);
        let sub_band_ratio = spectral.sub_band_energy_ratio(
            &prefix_power,
            descriptors.low_band_hz,
            descriptors.high_band_hz,
        );

        let mel_stats = MelStatistics::compute(&mel.flatten());

        let mut values = Vec::with_capacity(FEATURE_COUNT);
        values.extend_from_slice(&mean_mfcc(&mel));
        values.extend_from_slice(&[
            centroid,
            bandwidth,
            contrast,
            flatness,
            rolloff,
            spectral_entropy,
            zcr,
        ]);
        values.extend_from_slice(&[rms, peak, dynamic_range, energy_entropy]);
        values.extend(std::iter::repeat(0.0).take(RHYTHM_PLACEHOLDERS));
        values.push(onset_strength);
        values.extend(std::iter::repeat(0.0).take(IMPACT_PLACEHOLDERS));
        values.extend_from_slice(&mel_stats.to_array());
        values.extend_from_slice(&[f0, sub_band_ratio]);

        FeatureVector::from_values(values)
    }
}

fn mean_of(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CANONICAL_SAMPLE_RATE;

    const SAMPLE_RATE: u32 = CANONICAL_SAMPLE_RATE;

    /// Generate pure sine wave for testing
    fn generate_sine_wave(frequency: f32, amplitude: f32, duration_samples: usize) -> Vec<f32> {
        (0..duration_samples)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    /// Generate white noise for testing
    fn generate_white_noise(duration_samples: usize) -> Vec<f32> {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(7);
        (0..duration_samples)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect()
    }

    fn value(features: &FeatureVector, name: &str) -> f32 {
        features.get(name).expect("known slot")
    }

    #[test]
    fn test_silence_gives_all_zero_vector() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let features = extractor.extract(&vec![0.0; SAMPLE_RATE as usize]);
        assert_eq!(features.len(), FEATURE_COUNT);
        assert!(
            features.as_slice().iter().all(|v| v.abs() < 1e-6),
            "silence features: {:?}",
            features
        );
    }

    #[test]
    fn test_empty_input() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let features = extractor.extract(&[]);
        assert_eq!(features.len(), FEATURE_COUNT);
        assert!(features.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_short_input_zeroes_spectrogram_descriptors() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let signal = generate_sine_wave(440.0, 1.0, 1500);
        let features = extractor.extract(&signal);

        for name in [
            "spectral_centroid",
            "spectral_bandwidth",
            "spectral_contrast",
            "spectral_flatness",
            "spectral_rolloff",
            "spectral_entropy",
            "onset_strength_mean",
            "mel_mean",
            "mfcc_0",
        ] {
            assert_eq!(value(&features, name), 0.0, "{} should be 0", name);
        }
        // Waveform descriptors still see the samples
        assert!(value(&features, "rms_energy") > 0.5);
        assert!(value(&features, "zero_crossing_rate") > 0.0);
    }

    #[test]
    fn test_exact_window_produces_one_frame() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let signal = generate_sine_wave(1000.0, 1.0, 4096);
        let spectrogram = extractor.spectrogram(&signal[..2048]);
        assert_eq!(spectrogram.n_frames(), 1);

        let mel = extractor.mel_spectrogram(&spectrogram);
        assert_eq!(mel.n_frames(), 1);
        assert_eq!(mel.n_bins(), 128);
    }

    #[test]
    fn test_sine_end_to_end() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let signal = generate_sine_wave(300.0, 0.5, SAMPLE_RATE as usize);
        let features = extractor.extract(&signal);
        println!("300 Hz sine features: {:?}", features);

        assert_eq!(features.len(), 53);
        let f0 = value(&features, "fundamental_frequency");
        assert!((f0 - 300.0).abs() < 5.0, "f0 {}", f0);
        let rms = value(&features, "rms_energy");
        assert!((rms - 0.3535).abs() < 2e-3, "rms {}", rms);
        let zcr = value(&features, "zero_crossing_rate");
        assert!((zcr - 600.0 / 22050.0).abs() < 1e-3, "zcr {}", zcr);

        let centroid = value(&features, "spectral_centroid");
        assert!((centroid - 300.0).abs() < 50.0, "centroid {}", centroid);
        // A 300 Hz tone keeps almost all energy below 3 kHz
        assert!(value(&features, "sub_band_energy_ratio") > 10.0);
        assert!(value(&features, "spectral_flatness") < 0.2);
    }

    #[test]
    fn test_placeholders_are_zero() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let features = extractor.extract(&generate_white_noise(SAMPLE_RATE as usize / 2));
        for (slot, value) in features.named() {
            if !slot.implemented {
                assert_eq!(value, 0.0, "placeholder {} must stay 0", slot.name);
            }
        }
    }

    #[test]
    fn test_noise_vs_sine() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let sine = extractor.extract(&generate_sine_wave(1000.0, 1.0, 8192));
        let noise = extractor.extract(&generate_white_noise(8192));

        println!("Sine flatness: {}", value(&sine, "spectral_flatness"));
        println!("Noise flatness: {}", value(&noise, "spectral_flatness"));

        assert!(value(&noise, "spectral_flatness") > value(&sine, "spectral_flatness"));
        assert!(value(&noise, "zero_crossing_rate") > 0.3);
        assert!(value(&noise, "spectral_centroid") > 3000.0);
        assert!(value(&noise, "spectral_entropy") > value(&sine, "spectral_entropy"));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let signal = generate_white_noise(6000);
        assert_eq!(extractor.extract(&signal), extractor.extract(&signal));
    }

    #[test]
    fn test_trim_removes_leading_silence() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let tone = generate_sine_wave(440.0, 0.8, 8192);
        let mut padded = vec![0.0; 5000];
        padded.extend_from_slice(&tone);
        padded.extend(vec![0.0; 5000]);

        let prepared = extractor.prepare(&padded);
        assert!(prepared.len() <= tone.len());
        assert!(prepared.len() > tone.len() - 10);

        let with_padding = extractor.extract(&padded);
        let without = extractor.extract(&tone);
        let rms_a = value(&with_padding, "rms_energy");
        let rms_b = value(&without, "rms_energy");
        assert!((rms_a - rms_b).abs() < 1e-3);
    }

    #[test]
    fn test_default_prepare_keeps_recorded_level() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE);
        let tone = generate_sine_wave(300.0, 0.25, 8192);
        let prepared = extractor.prepare(&tone);
        let peak = prepared.iter().fold(0.0f32, |p, &x| p.max(x.abs()));
        assert!((peak - 0.25).abs() < 1e-3, "peak {}", peak);
    }

    #[test]
    fn test_zero_sample_rate_gives_all_zero_vector() {
        let tone = generate_sine_wave(300.0, 0.5, 8192);
        let features = FeatureExtractor::new(0).extract(&tone);
        assert_eq!(features.len(), FEATURE_COUNT);
        assert!(features.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_normalize_option_rescales_energy() {
        let mut config = AnalysisConfig::default();
        config.preprocess.normalize = true;
        let extractor = FeatureExtractor::with_config(SAMPLE_RATE, config).unwrap();
        let features = extractor.extract(&generate_sine_wave(300.0, 0.25, 8192));
        assert!((value(&features, "peak_amplitude") - 1.0).abs() < 1e-3);
        assert!((value(&features, "rms_energy") - 0.7071).abs() < 5e-3);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let mut config = AnalysisConfig::default();
        config.framing.n_fft = 1500;
        assert!(FeatureExtractor::with_config(SAMPLE_RATE, config).is_err());
        assert!(FeatureExtractor::with_config(0, AnalysisConfig::default()).is_err());
    }

    #[test]
    fn test_smaller_mel_resolution_keeps_vector_length() {
        let mut config = AnalysisConfig::default();
        config.mel.n_mels = 40;
        config.framing.n_fft = 1024;
        config.framing.hop_size = 256;
        let extractor = FeatureExtractor::with_config(SAMPLE_RATE, config).unwrap();
        let features = extractor.extract(&generate_sine_wave(500.0, 1.0, 6000));
        assert_eq!(features.len(), FEATURE_COUNT);
        assert!(value(&features, "mel_mean") > 0.0);
    }
}
