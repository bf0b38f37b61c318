use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::capture::{CaptureDevice, CaptureError};
use crate::audio::AudioPayload;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("no recording is in progress")]
    NotRecording,
}

/// Result of `Recorder::start`: either a fresh recording began, or the call
/// toggled an active recording to a stop and finalized its payload
#[derive(Debug)]
pub enum StartOutcome {
    Started,
    Stopped(AudioPayload),
}

/// Microphone recording state machine.
///
/// NOT_RECORDING → (start) → RECORDING → (stop, or start acting as a
/// toggle-stop) → NOT_RECORDING, emitting one finalized payload on the stop
/// transition. While recording, the elapsed counter ticks once per second on
/// a spawned task; the ticker is cancelled exactly once on stop, before any
/// fragment is finalized.
pub struct Recorder {
    device: Box<dyn CaptureDevice>,
    fragments: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
    elapsed: Arc<AtomicU64>,
    ticker: Option<JoinHandle<()>>,
    recording: bool,
}

impl Recorder {
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self {
            device,
            fragments: None,
            elapsed: Arc::new(AtomicU64::new(0)),
            ticker: None,
            recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Seconds elapsed in the current (or last) recording window
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    /// Start a new recording, discarding any previously accumulated data.
    ///
    /// Called while already recording, this acts as a toggle and stops
    /// instead, returning the finalized payload. A capture failure leaves the
    /// recorder in NOT_RECORDING.
    pub async fn start(&mut self) -> Result<StartOutcome, RecorderError> {
        if self.recording {
            let payload = self.stop().await?;
            return Ok(StartOutcome::Stopped(payload));
        }

        // Previous unfinalized take, if any, is dropped with its channel
        self.fragments = None;
        self.elapsed.store(0, Ordering::SeqCst);

        let fragments = self.device.start().await?;
        self.fragments = Some(fragments);

        let elapsed = Arc::clone(&self.elapsed);
        let start = tokio::time::Instant::now() + Duration::from_secs(1);
        self.ticker = Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval_at(start, Duration::from_secs(1));
            loop {
                tick.tick().await;
                elapsed.fetch_add(1, Ordering::SeqCst);
            }
        }));

        self.recording = true;
        info!("Recording started on {}", self.device.name());

        Ok(StartOutcome::Started)
    }

    /// Stop the recording and concatenate all fragments, in arrival order,
    /// into one payload
    pub async fn stop(&mut self) -> Result<AudioPayload, RecorderError> {
        if !self.recording {
            return Err(RecorderError::NotRecording);
        }
        self.recording = false;

        // Cancel the ticker before touching the accumulated audio
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }

        self.device.stop().await?;

        let mut bytes = Vec::new();
        if let Some(mut fragments) = self.fragments.take() {
            while let Some(fragment) = fragments.recv().await {
                bytes.extend_from_slice(&fragment);
            }
        }

        let payload = AudioPayload::from_recording(bytes, self.device.mime_type());
        debug!(
            "Recording stopped after {}s: {} bytes ({})",
            self.elapsed_seconds(),
            payload.size_bytes(),
            payload.mime_type()
        );

        Ok(payload)
    }
}
