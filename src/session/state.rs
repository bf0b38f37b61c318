/// Top-level state of the transcription session.
///
/// Exactly one submission may be processing at a time; editing the
/// transcript buffer never changes this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for selection, recording, or submission
    Idle,
    /// A transcription request is in flight
    Processing,
    /// The last submission failed; cleared by a new selection or clear
    Error,
}
