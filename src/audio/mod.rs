pub mod payload;
pub mod source;

pub use payload::{AudioError, AudioPayload, DEFAULT_RECORDING_MIME, RECORDING_LABEL};
pub use source::{AudioSource, PlaybackResource};
