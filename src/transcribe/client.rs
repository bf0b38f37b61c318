use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::TranscribeError;
use super::pipeline::{default_stages, PipelineStage, StageInput, StagePolicy};
use super::service::SpeechService;
use crate::audio::AudioPayload;

/// Canned transcript returned when the audio contains no transcribable speech
pub const SILENT_AUDIO_MESSAGE: &str =
    "The audio appears to be silent or could not be transcribed.";

/// The outcome of one successful transcription: the verbatim text and the
/// readability-formatted text (equal to the raw text when formatting was
/// skipped or fell back)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub raw_text: String,
    pub formatted_text: String,
}

impl Transcript {
    fn silent() -> Self {
        Self {
            raw_text: SILENT_AUDIO_MESSAGE.to_string(),
            formatted_text: SILENT_AUDIO_MESSAGE.to_string(),
        }
    }
}

/// Runs the staged remote transcription pipeline for one audio payload.
///
/// Each remote call is bounded by a client-side timeout. Every failure path
/// produces a `TranscribeError`; nothing escapes as a panic or a silently
/// dropped task.
pub struct TranscriptionClient {
    service: Arc<dyn SpeechService>,
    stages: Vec<Box<dyn PipelineStage>>,
    timeout: Duration,
}

impl TranscriptionClient {
    pub fn new(service: Arc<dyn SpeechService>, timeout: Duration) -> Self {
        Self {
            service,
            stages: default_stages(),
            timeout,
        }
    }

    pub fn with_stages(
        service: Arc<dyn SpeechService>,
        stages: Vec<Box<dyn PipelineStage>>,
        timeout: Duration,
    ) -> Self {
        Self {
            service,
            stages,
            timeout,
        }
    }

    /// Transcribe one payload through the stage pipeline.
    ///
    /// The first stage consumes the audio; if its trimmed output is empty the
    /// operation short-circuits with the canned silence transcript and no
    /// further stage runs. Later stages consume the running text; a stage
    /// whose policy is `FallbackToInput` keeps the prior text on any failure.
    pub async fn transcribe(&self, payload: &AudioPayload) -> Result<Transcript, TranscribeError> {
        info!(
            "Transcribing {} ({} bytes, {})",
            payload.source_label(),
            payload.size_bytes(),
            payload.mime_type()
        );

        let mut stages = self.stages.iter();

        let first = match stages.next() {
            Some(stage) => stage,
            None => return Ok(Transcript::silent()),
        };

        let raw_text = self
            .run_required(first.as_ref(), StageInput::Audio(payload))
            .await?
            .trim()
            .to_string();

        if raw_text.is_empty() {
            info!("Transcription came back empty; reporting silent audio");
            return Ok(Transcript::silent());
        }

        let mut text = raw_text.clone();
        for stage in stages {
            text = match stage.policy() {
                StagePolicy::Required => self
                    .run_required(stage.as_ref(), StageInput::Text(&text))
                    .await?
                    .trim()
                    .to_string(),
                StagePolicy::FallbackToInput => {
                    match tokio::time::timeout(
                        self.timeout,
                        stage.run(self.service.as_ref(), StageInput::Text(&text)),
                    )
                    .await
                    {
                        Ok(Ok(output)) => output.trim().to_string(),
                        Ok(Err(e)) => {
                            warn!("Stage '{}' failed ({}); keeping prior text", stage.name(), e);
                            text
                        }
                        Err(_) => {
                            warn!(
                                "Stage '{}' timed out after {:?}; keeping prior text",
                                stage.name(),
                                self.timeout
                            );
                            text
                        }
                    }
                }
            };
        }

        debug!("Transcription complete: {} chars", text.len());

        Ok(Transcript {
            raw_text,
            formatted_text: text,
        })
    }

    async fn run_required(
        &self,
        stage: &dyn PipelineStage,
        input: StageInput<'_>,
    ) -> Result<String, TranscribeError> {
        match tokio::time::timeout(self.timeout, stage.run(self.service.as_ref(), input)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(TranscribeError::Timeout(self.timeout)),
        }
    }
}
