use super::service::{ServiceError, SpeechService};
use crate::audio::AudioPayload;

const TRANSCRIBE_INSTRUCTION: &str = "Transcribe the following audio recording. \
    Provide only the transcribed text, without any additional comments or introductions.";

/// What happens when a stage fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePolicy {
    /// Failure fails the whole operation
    Required,
    /// Failure is logged and the stage's input text is passed through
    FallbackToInput,
}

/// Input to a pipeline stage: the audio clip for the first stage, the
/// previous stage's text for the rest
pub enum StageInput<'a> {
    Audio(&'a AudioPayload),
    Text(&'a str),
}

/// One named step of the transcription pipeline.
///
/// Stages run in sequence; each consumes the previous stage's output. Adding
/// or removing a stage does not touch the session state machine.
#[async_trait::async_trait]
pub trait PipelineStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn policy(&self) -> StagePolicy;

    async fn run(
        &self,
        service: &dyn SpeechService,
        input: StageInput<'_>,
    ) -> Result<String, ServiceError>;
}

/// Stage 1: verbatim transcription of the audio clip
pub struct TranscribeStage;

#[async_trait::async_trait]
impl PipelineStage for TranscribeStage {
    fn name(&self) -> &'static str {
        "transcribe"
    }

    fn policy(&self) -> StagePolicy {
        StagePolicy::Required
    }

    async fn run(
        &self,
        service: &dyn SpeechService,
        input: StageInput<'_>,
    ) -> Result<String, ServiceError> {
        match input {
            StageInput::Audio(payload) => {
                service
                    .generate_from_audio(payload, TRANSCRIBE_INSTRUCTION)
                    .await
            }
            StageInput::Text(text) => Ok(text.to_string()),
        }
    }
}

/// Stage 2: reformat the transcription for readability without changing words
pub struct FormatStage;

impl FormatStage {
    fn prompt(text: &str) -> String {
        format!(
            "Please format the following text with appropriate line breaks and paragraphs \
             to improve readability. Do not change the original words. \
             Return only the formatted text.\n\nText to format:\n\"\"\"\n{}\n\"\"\"",
            text
        )
    }
}

#[async_trait::async_trait]
impl PipelineStage for FormatStage {
    fn name(&self) -> &'static str {
        "format"
    }

    fn policy(&self) -> StagePolicy {
        StagePolicy::FallbackToInput
    }

    async fn run(
        &self,
        service: &dyn SpeechService,
        input: StageInput<'_>,
    ) -> Result<String, ServiceError> {
        match input {
            StageInput::Text(text) => service.generate_from_text(&Self::prompt(text)).await,
            StageInput::Audio(_) => Err(ServiceError::Parse(
                "format stage requires text input".to_string(),
            )),
        }
    }
}

/// The default two-stage pipeline
pub fn default_stages() -> Vec<Box<dyn PipelineStage>> {
    vec![Box::new(TranscribeStage), Box::new(FormatStage)]
}
