//! EchoText - speech-to-text capture and cleanup
//!
//! Captures or selects an audio clip, transcribes it through a remote
//! speech model in two stages (verbatim transcription, then readability
//! formatting), and hands the editable result to the system clipboard.

pub mod audio;
pub mod clipboard;
pub mod config;
pub mod recorder;
pub mod session;
pub mod transcribe;

pub use audio::{AudioPayload, AudioSource};
pub use clipboard::{Clipboard, SystemClipboard};
pub use config::Config;
pub use recorder::{Recorder, StartOutcome};
pub use session::{SessionController, SessionState};
pub use transcribe::{GeminiService, Transcript, TranscriptionClient};
