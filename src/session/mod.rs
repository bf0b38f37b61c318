//! Session state machine
//!
//! This module owns the lifecycle of one transcription session:
//! - `SessionState`: the Idle / Processing / Error machine
//! - `SessionController`: explicit context object holding the active audio
//!   payload, the editable transcript buffer, the last error, and the
//!   clipboard acknowledgment

mod controller;
mod state;

pub use controller::{SessionController, COPY_ACK_DURATION};
pub use state::SessionState;
