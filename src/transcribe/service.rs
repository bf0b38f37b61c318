use thiserror::Error;

use crate::audio::AudioPayload;

/// Remote text-and-audio generation failures
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("service returned no text")]
    EmptyResponse,

    #[error("failed to parse service response: {0}")]
    Parse(String),
}

/// Port for the remote speech/language model.
///
/// Both transcription and reformatting go through the same service and model
/// identifier; the two entry points only differ in whether audio accompanies
/// the instruction.
#[async_trait::async_trait]
pub trait SpeechService: Send + Sync {
    /// Send audio plus an instruction, returning the model's text
    async fn generate_from_audio(
        &self,
        payload: &AudioPayload,
        instruction: &str,
    ) -> Result<String, ServiceError>;

    /// Send a text-only prompt, returning the model's text
    async fn generate_from_text(&self, prompt: &str) -> Result<String, ServiceError>;
}
