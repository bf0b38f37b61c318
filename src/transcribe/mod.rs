//! Remote transcription
//!
//! This module provides the two-stage transcription pipeline:
//! - `SpeechService`: port for the remote generateContent API
//! - `GeminiService`: reqwest implementation of that port
//! - `TranscriptionClient`: runs the transcribe → format stage sequence with
//!   per-stage fallback policy and a bounded per-call timeout

mod client;
mod error;
mod gemini;
pub mod pipeline;
pub mod service;

pub use client::{Transcript, TranscriptionClient, SILENT_AUDIO_MESSAGE};
pub use error::TranscribeError;
pub use gemini::GeminiService;
pub use service::{ServiceError, SpeechService};
