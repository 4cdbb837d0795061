// Thump Features - offline acoustic feature extraction
// Mono waveform in, fixed 53-value descriptor vector out

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod service;
pub mod source;

// Re-exports for convenience
pub use analysis::{
    extract_features, feature_names, FeatureCategory, FeatureExtractor, FeatureSlot,
    FeatureVector, FEATURE_COUNT, FEATURE_SLOTS,
};
pub use config::{AnalysisConfig, CANONICAL_SAMPLE_RATE};
pub use error::{AnalysisError, ErrorCode};
pub use service::{analyze_clip, analyze_source};
pub use source::{AudioClip, SyntheticSource, SyntheticSpec, WavFileSource, WaveformSource};

/// Install a stderr fmt subscriber for binaries
///
/// `log` records from the library are bridged into the subscriber. Calling it
/// twice is harmless; the second call is ignored.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
