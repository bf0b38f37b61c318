//! Microphone recording
//!
//! This module provides the `Recorder` state machine that manages:
//! - Capture start/stop with capability-failure reporting
//! - A once-per-second elapsed-time ticker while recording
//! - Fragment accumulation and finalization into one `AudioPayload`

pub mod capture;
pub mod mic;
mod recorder;

pub use capture::{CaptureDevice, CaptureError};
pub use mic::MicrophoneDevice;
pub use recorder::{Recorder, RecorderError, StartOutcome};
