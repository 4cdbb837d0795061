// WAV decoding and encoding via hound
//
// Multi-channel files are down-mixed to mono by averaging each frame. Integer
// PCM is scaled to [-1, 1] by the format's positive full scale.

use std::path::{Path, PathBuf};

use log::debug;

use super::{AudioClip, WaveformSource};
use crate::error::AnalysisError;

/// Waveform source backed by a WAV file on disk
#[derive(Debug, Clone)]
pub struct WavFileSource {
    path: PathBuf,
}

impl WavFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WaveformSource for WavFileSource {
    fn describe(&self) -> String {
        format!("wav:{}", self.path.display())
    }

    fn read_clip(&self) -> Result<AudioClip, AnalysisError> {
        read_wav(&self.path)
    }
}

/// Decode a WAV file into a mono clip
pub fn read_wav(path: &Path) -> Result<AudioClip, AnalysisError> {
    let mut reader = hound::WavReader::open(path).map_err(|err| match AnalysisError::from(err) {
        AnalysisError::Io { details } => AnalysisError::Io {
            details: format!("failed to open {}: {}", path.display(), details),
        },
        other => other,
    })?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AnalysisError::UnsupportedFormat {
            details: format!("{} has zero channels", path.display()),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            8 | 16 | 24 | 32 => {
                let full_scale = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|value| value as f32 / full_scale))
                    .collect::<Result<Vec<f32>, _>>()?
            }
            other => {
                return Err(AnalysisError::UnsupportedFormat {
                    details: format!(
                        "unsupported bits per sample {} in {}",
                        other,
                        path.display()
                    ),
                })
            }
        },
    };

    let samples = downmix(&interleaved, spec.channels as usize);
    debug!(
        "[Wav] Read {} ({} Hz, {} ch) -> {} mono samples",
        path.display(),
        spec.sample_rate,
        spec.channels,
        samples.len()
    );

    Ok(AudioClip::new(samples, spec.sample_rate))
}

/// Write a mono clip as 32-bit float WAV
pub fn write_wav(path: &Path, clip: &AudioClip) -> Result<(), AnalysisError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &clip.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Average interleaved frames down to one channel
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
