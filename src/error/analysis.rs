// Analysis boundary error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Single source of truth for the numeric codes reported by the CLI and
/// by any host embedding the crate.
///
/// Error code range: 2001-2006
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Configuration value is out of range or inconsistent
    pub const INVALID_CONFIG: i32 = 2001;

    /// Reading or writing a file failed
    pub const IO: i32 = 2002;

    /// Audio container could not be decoded
    pub const DECODE: i32 = 2003;

    /// Audio format is valid but not supported (bit depth, channel layout)
    pub const UNSUPPORTED_FORMAT: i32 = 2004;

    /// Analysis did not finish within the caller's timeout
    pub const TIMEOUT: i32 = 2005;

    /// Background analysis task panicked or was cancelled
    pub const TASK_FAILED: i32 = 2006;
}

/// Log an analysis error with structured context
///
/// Fields logged:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component={}, message={}",
        context,
        err.code(),
        err.component(),
        err.message()
    );
}

/// Errors raised around the feature extraction core
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Configuration value is out of range or inconsistent
    InvalidConfig { reason: String },

    /// Reading or writing a file failed
    Io { details: String },

    /// Audio container could not be decoded
    Decode { details: String },

    /// Audio format is valid but not supported
    UnsupportedFormat { details: String },

    /// Analysis did not finish within the caller's timeout
    Timeout { timeout_ms: u64 },

    /// Background analysis task panicked or was cancelled
    TaskFailed { reason: String },
}

impl AnalysisError {
    /// Name of the component that raises this kind of error
    pub fn component(&self) -> &'static str {
        match self {
            AnalysisError::InvalidConfig { .. } => "AnalysisConfig",
            AnalysisError::Io { .. }
            | AnalysisError::Decode { .. }
            | AnalysisError::UnsupportedFormat { .. } => "WaveformSource",
            AnalysisError::Timeout { .. } | AnalysisError::TaskFailed { .. } => "AnalysisService",
        }
    }
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::InvalidConfig { .. } => AnalysisErrorCodes::INVALID_CONFIG,
            AnalysisError::Io { .. } => AnalysisErrorCodes::IO,
            AnalysisError::Decode { .. } => AnalysisErrorCodes::DECODE,
            AnalysisError::UnsupportedFormat { .. } => AnalysisErrorCodes::UNSUPPORTED_FORMAT,
            AnalysisError::Timeout { .. } => AnalysisErrorCodes::TIMEOUT,
            AnalysisError::TaskFailed { .. } => AnalysisErrorCodes::TASK_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::InvalidConfig { reason } => {
                format!("Invalid analysis configuration: {}", reason)
            }
            AnalysisError::Io { details } => format!("I/O error: {}", details),
            AnalysisError::Decode { details } => format!("Failed to decode audio: {}", details),
            AnalysisError::UnsupportedFormat { details } => {
                format!("Unsupported audio format: {}", details)
            }
            AnalysisError::Timeout { timeout_ms } => {
                format!("Analysis timed out after {} ms", timeout_ms)
            }
            AnalysisError::TaskFailed { reason } => {
                format!("Analysis task failed: {}", reason)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Io {
            details: err.to_string(),
        }
    }
}

impl From<hound::Error> for AnalysisError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => AnalysisError::Io {
                details: io.to_string(),
            },
            hound::Error::Unsupported => AnalysisError::UnsupportedFormat {
                details: "unsupported WAV feature".to_string(),
            },
            other => AnalysisError::Decode {
                details: other.to_string(),
            },
        }
    }
}
