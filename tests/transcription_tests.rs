// Integration tests for the staged transcription pipeline
//
// These tests drive TranscriptionClient against stub speech services to
// verify stage ordering, the silence short-circuit, format fallback, and
// the per-call timeout.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use echotext::audio::AudioPayload;
use echotext::transcribe::{
    ServiceError, SpeechService, TranscribeError, TranscriptionClient, SILENT_AUDIO_MESSAGE,
};

const TIMEOUT: Duration = Duration::from_secs(30);

/// Stub service with fixed replies and per-entry-point call counters
struct StubService {
    audio_reply: String,
    text_reply: Option<String>,
    audio_calls: AtomicUsize,
    text_calls: AtomicUsize,
}

impl StubService {
    fn new(audio_reply: &str, text_reply: Option<&str>) -> Self {
        Self {
            audio_reply: audio_reply.to_string(),
            text_reply: text_reply.map(str::to_string),
            audio_calls: AtomicUsize::new(0),
            text_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechService for StubService {
    async fn generate_from_audio(
        &self,
        _payload: &AudioPayload,
        _instruction: &str,
    ) -> Result<String, ServiceError> {
        self.audio_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.audio_reply.clone())
    }

    async fn generate_from_text(&self, _prompt: &str) -> Result<String, ServiceError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        match &self.text_reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ServiceError::Status {
                status: 500,
                message: "internal error".to_string(),
            }),
        }
    }
}

/// Stub service whose calls never complete, for timeout tests
struct HangingService {
    hang_audio: bool,
}

#[async_trait]
impl SpeechService for HangingService {
    async fn generate_from_audio(
        &self,
        _payload: &AudioPayload,
        _instruction: &str,
    ) -> Result<String, ServiceError> {
        if self.hang_audio {
            std::future::pending::<()>().await;
        }
        Ok("the quick brown fox".to_string())
    }

    async fn generate_from_text(&self, _prompt: &str) -> Result<String, ServiceError> {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

fn sample_payload() -> AudioPayload {
    AudioPayload::from_recording(vec![1, 2, 3, 4], None)
}

#[tokio::test]
async fn test_two_stage_pipeline_produces_raw_and_formatted_text() -> Result<()> {
    let service = Arc::new(StubService::new(
        "hello world this is a test",
        Some("Hello world.\n\nThis is a test."),
    ));
    let client = TranscriptionClient::new(service.clone(), TIMEOUT);

    let transcript = client.transcribe(&sample_payload()).await?;

    assert_eq!(transcript.raw_text, "hello world this is a test");
    assert_eq!(transcript.formatted_text, "Hello world.\n\nThis is a test.");
    assert_eq!(service.audio_calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.text_calls.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_empty_transcription_short_circuits_with_silence_message() -> Result<()> {
    let service = Arc::new(StubService::new("   \n  ", Some("should never run")));
    let client = TranscriptionClient::new(service.clone(), TIMEOUT);

    let transcript = client.transcribe(&sample_payload()).await?;

    assert_eq!(transcript.raw_text, SILENT_AUDIO_MESSAGE);
    assert_eq!(transcript.formatted_text, SILENT_AUDIO_MESSAGE);

    // The format stage must not run for silent audio
    assert_eq!(service.text_calls.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn test_format_failure_falls_back_to_raw_text() -> Result<()> {
    let service = Arc::new(StubService::new("unformatted but usable text", None));
    let client = TranscriptionClient::new(service.clone(), TIMEOUT);

    let transcript = client.transcribe(&sample_payload()).await?;

    assert_eq!(transcript.raw_text, "unformatted but usable text");
    assert_eq!(
        transcript.formatted_text, transcript.raw_text,
        "failed formatting should keep the raw transcription"
    );
    assert_eq!(service.text_calls.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_stage_outputs_are_trimmed() -> Result<()> {
    let service = Arc::new(StubService::new(
        "  hello there \n",
        Some("\nHello there.\n"),
    ));
    let client = TranscriptionClient::new(service, TIMEOUT);

    let transcript = client.transcribe(&sample_payload()).await?;

    assert_eq!(transcript.raw_text, "hello there");
    assert_eq!(transcript.formatted_text, "Hello there.");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_transcription_stage_timeout_fails_the_operation() {
    let service = Arc::new(HangingService { hang_audio: true });
    let client = TranscriptionClient::new(service, Duration::from_secs(5));

    let result = client.transcribe(&sample_payload()).await;

    match result {
        Err(TranscribeError::Timeout(elapsed)) => {
            assert_eq!(elapsed, Duration::from_secs(5));
        }
        other => panic!("expected timeout error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_format_stage_timeout_falls_back_to_raw_text() -> Result<()> {
    let service = Arc::new(HangingService { hang_audio: false });
    let client = TranscriptionClient::new(service, Duration::from_secs(5));

    let transcript = client.transcribe(&sample_payload()).await?;

    assert_eq!(transcript.raw_text, "the quick brown fox");
    assert_eq!(
        transcript.formatted_text, "the quick brown fox",
        "a formatting timeout should keep the raw transcription"
    );

    Ok(())
}
