// Integration tests for the microphone recording state machine
//
// A stub capture device stands in for the real microphone so the tests can
// verify fragment ordering, toggle-stop, discard-on-restart, the elapsed
// ticker, and capture-failure handling.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use echotext::audio::{DEFAULT_RECORDING_MIME, RECORDING_LABEL};
use echotext::recorder::{CaptureDevice, CaptureError, Recorder, RecorderError, StartOutcome};

/// Stub device that emits one programmed take per `start` call
struct StubDevice {
    takes: Arc<Mutex<VecDeque<Vec<Vec<u8>>>>>,
    mime: Option<String>,
    sender: Option<mpsc::UnboundedSender<Vec<u8>>>,
}

impl StubDevice {
    fn new(takes: Vec<Vec<Vec<u8>>>, mime: Option<&str>) -> Self {
        Self {
            takes: Arc::new(Mutex::new(takes.into())),
            mime: mime.map(str::to_string),
            sender: None,
        }
    }
}

#[async_trait]
impl CaptureDevice for StubDevice {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, CaptureError> {
        let take = self
            .takes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no programmed take".to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        for fragment in take {
            tx.send(fragment).ok();
        }
        self.sender = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        // Dropping the sender lets the fragment drain terminate
        self.sender = None;
        Ok(())
    }

    fn mime_type(&self) -> Option<String> {
        self.mime.clone()
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Device whose `start` always fails with a permission error
struct DeniedDevice;

#[async_trait]
impl CaptureDevice for DeniedDevice {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, CaptureError> {
        Err(CaptureError::PermissionDenied(
            "microphone access denied".to_string(),
        ))
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn mime_type(&self) -> Option<String> {
        None
    }

    fn name(&self) -> &str {
        "denied"
    }
}

#[tokio::test]
async fn test_stop_concatenates_fragments_in_arrival_order() -> Result<()> {
    let device = StubDevice::new(
        vec![vec![b"abc".to_vec(), b"def".to_vec(), b"g".to_vec()]],
        Some("audio/wav"),
    );
    let mut recorder = Recorder::new(Box::new(device));

    assert!(matches!(recorder.start().await?, StartOutcome::Started));
    assert!(recorder.is_recording());

    let payload = recorder.stop().await?;

    assert_eq!(payload.bytes(), b"abcdefg");
    assert_eq!(payload.mime_type(), "audio/wav");
    assert_eq!(payload.source_label(), RECORDING_LABEL);
    assert!(!recorder.is_recording());

    Ok(())
}

#[tokio::test]
async fn test_recording_without_device_mime_defaults_to_webm() -> Result<()> {
    let device = StubDevice::new(vec![vec![b"data".to_vec()]], None);
    let mut recorder = Recorder::new(Box::new(device));

    recorder.start().await?;
    let payload = recorder.stop().await?;

    assert_eq!(payload.mime_type(), DEFAULT_RECORDING_MIME);

    Ok(())
}

#[tokio::test]
async fn test_start_while_recording_acts_as_toggle_stop() -> Result<()> {
    let device = StubDevice::new(vec![vec![b"take one".to_vec()]], None);
    let mut recorder = Recorder::new(Box::new(device));

    assert!(matches!(recorder.start().await?, StartOutcome::Started));

    match recorder.start().await? {
        StartOutcome::Stopped(payload) => {
            assert_eq!(payload.bytes(), b"take one");
        }
        StartOutcome::Started => panic!("second start should stop the recording"),
    }
    assert!(!recorder.is_recording());

    Ok(())
}

#[tokio::test]
async fn test_restart_discards_previous_take() -> Result<()> {
    let device = StubDevice::new(
        vec![vec![b"old take".to_vec()], vec![b"new take".to_vec()]],
        None,
    );
    let mut recorder = Recorder::new(Box::new(device));

    recorder.start().await?;
    recorder.stop().await?;

    recorder.start().await?;
    let payload = recorder.stop().await?;

    assert_eq!(
        payload.bytes(),
        b"new take",
        "a fresh recording must not include data from a previous take"
    );

    Ok(())
}

#[tokio::test]
async fn test_stop_without_recording_is_an_error() {
    let device = StubDevice::new(vec![], None);
    let mut recorder = Recorder::new(Box::new(device));

    assert!(matches!(
        recorder.stop().await,
        Err(RecorderError::NotRecording)
    ));
}

#[tokio::test]
async fn test_capture_failure_leaves_recorder_stopped() {
    let mut recorder = Recorder::new(Box::new(DeniedDevice));

    match recorder.start().await {
        Err(RecorderError::Capture(CaptureError::PermissionDenied(_))) => {}
        other => panic!("expected permission error, got {:?}", other),
    }
    assert!(!recorder.is_recording());
    assert_eq!(recorder.elapsed_seconds(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_ticks_once_per_second_and_stops_with_recording() -> Result<()> {
    let device = StubDevice::new(vec![vec![b"tick".to_vec()]], None);
    let mut recorder = Recorder::new(Box::new(device));

    recorder.start().await?;
    assert_eq!(recorder.elapsed_seconds(), 0);

    for expected in 1..=3 {
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert_eq!(recorder.elapsed_seconds(), expected);
    }

    recorder.stop().await?;

    // The ticker is cancelled on stop; time passing changes nothing
    tokio::time::advance(Duration::from_secs(10)).await;
    tokio::task::yield_now().await;
    assert_eq!(recorder.elapsed_seconds(), 3);

    Ok(())
}
