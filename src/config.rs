//! Configuration for the feature extraction pipeline
//!
//! Every analysis constant (frame geometry, mel resolution, descriptor band
//! edges) lives here so experiments can run from a JSON file without
//! recompiling. The defaults reproduce the canonical 22050 Hz pipeline. Only
//! parameters that keep the 53-slot vector shape are exposed; the MFCC count
//! is a constant of the feature layout, not a setting.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AnalysisError;

/// Canonical analysis sample rate in Hz
pub const CANONICAL_SAMPLE_RATE: u32 = 22_050;

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    #[serde(default)]
    pub framing: FramingConfig,
    #[serde(default)]
    pub mel: MelConfig,
    #[serde(default)]
    pub descriptors: DescriptorConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Amplitude normalization and silence trimming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Trim leading/trailing samples below `silence_threshold` (relative to peak)
    pub trim: bool,
    /// Peak-normalize the trimmed waveform before measuring descriptors
    pub normalize: bool,
    /// Threshold on |sample| / peak that marks the start and end of the sound
    pub silence_threshold: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            trim: true,
            // Energy descriptors are reported at the recording's own level
            normalize: false,
            silence_threshold: 0.01,
        }
    }
}

/// STFT frame geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramingConfig {
    /// FFT size in samples (power of two)
    pub n_fft: usize,
    /// Hop between consecutive frames in samples
    pub hop_size: usize,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_size: 512,
        }
    }
}

/// Mel filter bank resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelConfig {
    /// Number of triangular mel bands
    pub n_mels: usize,
}

impl Default for MelConfig {
    fn default() -> Self {
        Self { n_mels: 128 }
    }
}

/// Parameters of individual descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorConfig {
    /// Fraction of frame energy that defines the rolloff frequency
    pub rolloff_fraction: f32,
    /// Lowest fundamental frequency searched by the autocorrelation (Hz)
    pub f0_min_hz: f32,
    /// Highest fundamental frequency searched by the autocorrelation (Hz)
    pub f0_max_hz: f32,
    /// Numerator band of the sub-band energy ratio (Hz, [low, high))
    pub low_band_hz: (f32, f32),
    /// Denominator band of the sub-band energy ratio (Hz, [low, high))
    pub high_band_hz: (f32, f32),
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            rolloff_fraction: 0.85,
            f0_min_hz: 50.0,
            f0_max_hz: 1000.0,
            low_band_hz: (250.0, 3000.0),
            high_band_hz: (3000.0, 8000.0),
        }
    }
}

/// Async boundary settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Upper bound for a whole analysis call; `None` waits indefinitely
    pub timeout_ms: Option<u64>,
}

impl AnalysisConfig {
    /// Check that every parameter is usable by the pipeline
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let invalid = |reason: String| Err(AnalysisError::InvalidConfig { reason });

        let n_fft = self.framing.n_fft;
        if n_fft < 2 || !n_fft.is_power_of_two() {
            return invalid(format!("n_fft must be a power of two >= 2 (got {})", n_fft));
        }
        if self.framing.hop_size == 0 {
            return invalid("hop_size must be greater than 0".to_string());
        }
        if self.mel.n_mels < crate::analysis::N_MFCC {
            return invalid(format!(
                "n_mels must be at least {} (got {})",
                crate::analysis::N_MFCC,
                self.mel.n_mels
            ));
        }

        let threshold = self.preprocess.silence_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return invalid(format!(
                "silence_threshold must be within [0, 1) (got {})",
                threshold
            ));
        }

        let descriptors = &self.descriptors;
        if !(descriptors.rolloff_fraction > 0.0 && descriptors.rolloff_fraction <= 1.0) {
            return invalid(format!(
                "rolloff_fraction must be within (0, 1] (got {})",
                descriptors.rolloff_fraction
            ));
        }
        if !(descriptors.f0_min_hz > 0.0 && descriptors.f0_min_hz < descriptors.f0_max_hz) {
            return invalid(format!(
                "f0 search range must satisfy 0 < min < max (got {}..{})",
                descriptors.f0_min_hz, descriptors.f0_max_hz
            ));
        }
        for (name, (low, high)) in [
            ("low_band_hz", descriptors.low_band_hz),
            ("high_band_hz", descriptors.high_band_hz),
        ] {
            if !(low >= 0.0 && low < high) {
                return invalid(format!(
                    "{} must satisfy 0 <= low < high (got {}..{})",
                    name, low, high
                ));
            }
        }

        Ok(())
    }

    /// Load and validate configuration from a JSON file, surfacing every failure
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let contents = fs::read_to_string(&path)?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|err| AnalysisError::InvalidConfig {
                reason: format!("{}: {}", path.as_ref().display(), err),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults when the file is missing,
    /// malformed or fails validation (a warning is logged in each case)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_json_file(&path) {
            Ok(config) => {
                log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                config
            }
            Err(err) => {
                log::warn!(
                    "[Config] Failed to load {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
