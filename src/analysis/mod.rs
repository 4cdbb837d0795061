// Analysis module - offline feature extraction for impact recordings
//
// Batch-only: a whole mono waveform goes in, a 53-value feature vector comes
// out. Nothing here records, stores, transmits or renders audio, and no
// state survives between calls.

pub mod features;
pub mod preprocess;

pub use features::{
    feature_index, feature_names, FeatureCategory, FeatureExtractor, FeatureSlot, FeatureVector,
    MelSpectrogram, Spectrogram, FEATURE_COUNT, FEATURE_SLOTS, N_MFCC,
};
pub use preprocess::{normalize_peak, preprocess, trim_bounds, trim_silence};

/// Extract the feature vector of a mono recording with default settings
///
/// Blocking, side-effect free and reentrant. The caller is responsible for
/// resampling and down-mixing before the call.
///
/// # Arguments
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate of `samples` in Hz (22050 canonical); 0
///   yields an all-zero vector
pub fn extract_features(samples: &[f32], sample_rate: u32) -> FeatureVector {
    FeatureExtractor::new(sample_rate).extract(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_features_silence() {
        let features = extract_features(&[0.0; 10_000], 22_050);
        assert_eq!(features.len(), FEATURE_COUNT);
        assert!(preprocess(&[0.0; 10_000], 22_050).is_empty());
    }

    #[test]
    fn test_extract_features_matches_extractor() {
        let signal: Vec<f32> = (0..5000).map(|i| ((i % 50) as f32 / 25.0) - 1.0).collect();
        let extractor = FeatureExtractor::new(22_050);
        assert_eq!(extract_features(&signal, 22_050), extractor.extract(&signal));
    }

    #[test]
    fn test_extract_features_zero_rate_is_all_zero() {
        let signal: Vec<f32> = (0..5000).map(|i| ((i % 50) as f32 / 25.0) - 1.0).collect();
        let features = extract_features(&signal, 0);
        assert!(features.as_slice().iter().all(|v| *v == 0.0));
    }
}
