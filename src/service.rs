// Async analysis boundary
//
// The extractor is pure CPU work, so it runs on tokio's blocking pool. A caller
// timeout only stops the wait: an extraction already in flight runs to
// completion and its result is discarded.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::analysis::{FeatureExtractor, FeatureVector};
use crate::error::{log_analysis_error, AnalysisError};
use crate::source::{AudioClip, WaveformSource};

/// Extract features for an in-memory clip off the async executor
///
/// # Arguments
/// * `extractor` - Shared extractor; its sample rate should match the clip's
/// * `clip` - Mono waveform to analyze
/// * `timeout` - Optional upper bound on the wait
///
/// # Errors
/// * `Timeout` - The deadline elapsed before the extraction finished
/// * `TaskFailed` - The blocking task panicked or was cancelled
pub async fn analyze_clip(
    extractor: Arc<FeatureExtractor>,
    clip: AudioClip,
    timeout: Option<Duration>,
) -> Result<FeatureVector, AnalysisError> {
    warn_on_rate_mismatch(&extractor, &clip);

    let task = tokio::task::spawn_blocking(move || extractor.extract(&clip.samples));
    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| AnalysisError::Timeout {
                timeout_ms: limit.as_millis() as u64,
            })?,
        None => task.await,
    };

    joined.map_err(|err| AnalysisError::TaskFailed {
        reason: err.to_string(),
    })
}

/// Read a clip from `source` and extract its features
///
/// Reading happens on the blocking pool as well, since file sources do I/O.
/// The timeout covers the extraction only.
pub async fn analyze_source(
    extractor: Arc<FeatureExtractor>,
    source: Arc<dyn WaveformSource>,
    timeout: Option<Duration>,
) -> Result<(AudioClip, FeatureVector), AnalysisError> {
    let description = source.describe();
    debug!("[Service] Reading clip from {}", description);

    let clip = tokio::task::spawn_blocking(move || source.read_clip())
        .await
        .map_err(|err| AnalysisError::TaskFailed {
            reason: err.to_string(),
        })?
        .map_err(|err| {
            log_analysis_error(&err, &description);
            err
        })?;

    info!(
        "[Service] Analyzing {} ({} samples, {:.1} ms)",
        description,
        clip.samples.len(),
        clip.duration_ms()
    );

    let features = analyze_clip(extractor, clip.clone(), timeout).await?;
    Ok((clip, features))
}

fn warn_on_rate_mismatch(extractor: &FeatureExtractor, clip: &AudioClip) {
    if clip.sample_rate != extractor.sample_rate() {
        warn!(
            "[Service] Clip sample rate {} Hz differs from extractor rate {} Hz; frequency features will be scaled",
            clip.sample_rate,
            extractor.sample_rate()
        );
    }
}
