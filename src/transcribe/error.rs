use std::time::Duration;
use thiserror::Error;

use super::service::ServiceError;

/// Failures of the overall transcription operation.
///
/// Success and failure are carried by the `Result` discriminant; callers
/// match on variants rather than inspecting the returned text.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// Missing credential, fatal to any transcribe attempt and reported
    /// distinctly from network/service errors
    #[error("transcription is not configured: set the {0} environment variable")]
    MissingCredential(&'static str),

    #[error("transcription failed: {0}")]
    Service(#[from] ServiceError),

    #[error("transcription timed out after {0:?}")]
    Timeout(Duration),
}
