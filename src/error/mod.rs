// Error types for the feature extraction crate
//
// The numeric core never fails: degenerate input degrades to 0.0. These types
// cover the boundary around it (configuration, WAV decoding, file I/O and the
// async analysis wrapper), each carrying a stable numeric code.

mod analysis;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, so callers outside Rust can branch on a
/// number instead of parsing text.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
