//! Waveform sources feeding the analysis core.
//!
//! The core only accepts an in-memory mono waveform at a known sample rate.
//! Sources sit in front of it and own everything that can fail: decoding WAV
//! files, down-mixing channels, or generating deterministic test signals.
//! Resampling is not done here; a clip keeps the rate it was produced at and
//! callers are expected to analyze it at that rate.

mod synthetic;
mod wav;

pub use synthetic::{SyntheticPattern, SyntheticSource, SyntheticSpec};
pub use wav::{read_wav, write_wav, WavFileSource};

use crate::error::AnalysisError;

/// Owned mono waveform plus its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 * 1_000.0 / self.sample_rate as f64
    }
}

/// Anything that can hand the core a finished mono clip.
pub trait WaveformSource: Send + Sync {
    /// Short description for logs and reports
    fn describe(&self) -> String;

    /// Produce the clip (blocking; may perform file I/O)
    fn read_clip(&self) -> Result<AudioClip, AnalysisError>;
}
