use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::state::SessionState;
use crate::audio::{AudioError, AudioPayload, AudioSource};
use crate::clipboard::Clipboard;
use crate::transcribe::{TranscribeError, TranscriptionClient};

/// How long the transient "copied" acknowledgment stays up
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(2);

/// Owner of the session state machine and all shared mutable session state.
///
/// The controller is an explicit context object: clones share the same
/// session, and all transitions go through its methods. An atomic in-flight
/// flag makes `submit` a no-op while a request is processing, giving
/// at-most-once-concurrent semantics without locking across the remote call.
#[derive(Clone)]
pub struct SessionController {
    client: Option<Arc<TranscriptionClient>>,
    clipboard: Arc<dyn Clipboard>,
    state: Arc<Mutex<SessionState>>,
    source: Arc<Mutex<AudioSource>>,
    transcript: Arc<Mutex<String>>,
    last_error: Arc<Mutex<Option<String>>>,
    in_flight: Arc<AtomicBool>,
    /// Bumped on every selection/clear; stale submissions discard their result
    generation: Arc<AtomicU64>,
    copied: Arc<AtomicBool>,
    copy_token: Arc<AtomicU64>,
}

impl SessionController {
    /// Create a session. `client` is `None` when the remote-service
    /// credential is not configured; the session still works for selection
    /// and editing, and `submit` reports the configuration error.
    pub fn new(client: Option<Arc<TranscriptionClient>>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            client,
            clipboard,
            state: Arc::new(Mutex::new(SessionState::Idle)),
            source: Arc::new(Mutex::new(AudioSource::new())),
            transcript: Arc::new(Mutex::new(String::new())),
            last_error: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            copied: Arc::new(AtomicBool::new(false)),
            copy_token: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    pub async fn transcript(&self) -> String {
        self.transcript.lock().await.clone()
    }

    /// Replace the editable buffer with a user edit; never touches the state
    pub async fn set_transcript(&self, text: impl Into<String>) {
        *self.transcript.lock().await = text.into();
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    pub async fn payload_label(&self) -> Option<String> {
        self.source
            .lock()
            .await
            .payload()
            .map(|p| p.source_label().to_string())
    }

    pub fn is_copied(&self) -> bool {
        self.copied.load(Ordering::SeqCst)
    }

    /// Select an audio file, replacing any prior payload and clearing any
    /// prior result or error
    pub async fn select_file(&self, path: impl AsRef<Path>) -> Result<(), AudioError> {
        let mut source = self.source.lock().await;
        let payload = source.set_from_file(path)?;
        info!(
            "Selected {} ({} bytes)",
            payload.source_label(),
            payload.size_bytes()
        );
        drop(source);

        self.invalidate_result().await;
        Ok(())
    }

    /// Attach a finalized recording, replacing any prior payload and clearing
    /// any prior result or error
    pub async fn set_recording(&self, payload: AudioPayload) {
        info!("Attached recording ({} bytes)", payload.size_bytes());
        self.source.lock().await.set_from_recording(payload);
        self.invalidate_result().await;
    }

    /// Drop the current payload and reset to idle
    pub async fn clear(&self) {
        self.source.lock().await.clear();
        self.invalidate_result().await;
    }

    /// Submit the current payload for transcription.
    ///
    /// No-op when no payload is present or when a submission is already
    /// processing. A missing credential is returned as an error without
    /// entering the processing state; remote failures are stored on the
    /// session as the error state instead of propagating.
    pub async fn submit(&self) -> Result<(), TranscribeError> {
        let client = match &self.client {
            Some(client) => Arc::clone(client),
            None => {
                let err = TranscribeError::MissingCredential(crate::config::API_KEY_ENV);
                *self.last_error.lock().await = Some(err.to_string());
                *self.state.lock().await = SessionState::Error;
                return Err(err);
            }
        };

        let payload = match self.source.lock().await.payload().cloned() {
            Some(payload) => payload,
            None => {
                debug!("Submit ignored: no audio payload selected");
                return Ok(());
            }
        };

        // At most one request in flight per session
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Submit ignored: a transcription is already processing");
            return Ok(());
        }

        let generation = self.generation.load(Ordering::SeqCst);

        *self.last_error.lock().await = None;
        self.transcript.lock().await.clear();
        *self.state.lock().await = SessionState::Processing;

        let result = client.transcribe(&payload).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            // The payload was replaced or cleared while we were processing;
            // the session has already been reset
            debug!("Discarding transcription result for a replaced payload");
            self.in_flight.store(false, Ordering::SeqCst);
            return Ok(());
        }

        match result {
            Ok(transcript) => {
                *self.transcript.lock().await = transcript.formatted_text;
                *self.state.lock().await = SessionState::Idle;
            }
            Err(e) => {
                error!("Transcription failed: {}", e);
                *self.last_error.lock().await = Some(e.to_string());
                *self.state.lock().await = SessionState::Error;
            }
        }

        self.in_flight.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Copy the editable buffer to the system clipboard.
    ///
    /// Failure is logged and changes nothing; success raises the "copied"
    /// acknowledgment, which reverts on its own after `COPY_ACK_DURATION`.
    pub async fn copy_to_clipboard(&self) {
        let text = self.transcript.lock().await.clone();

        if let Err(e) = self.clipboard.set_text(&text) {
            warn!("Failed to copy transcript to clipboard: {}", e);
            return;
        }

        let token = self.copy_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.copied.store(true, Ordering::SeqCst);

        let copied = Arc::clone(&self.copied);
        let copy_token = Arc::clone(&self.copy_token);
        tokio::spawn(async move {
            tokio::time::sleep(COPY_ACK_DURATION).await;
            // Only the acknowledgment's own copy reverts it
            if copy_token.load(Ordering::SeqCst) == token {
                copied.store(false, Ordering::SeqCst);
            }
        });
    }

    // Shared reset for every path that replaces or discards the payload
    async fn invalidate_result(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.transcript.lock().await.clear();
        *self.last_error.lock().await = None;
        *self.state.lock().await = SessionState::Idle;
    }
}
