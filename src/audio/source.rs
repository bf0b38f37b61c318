use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::payload::{AudioError, AudioPayload};

/// Transient on-disk copy of the active clip for playback by external tools.
///
/// Released exactly once: either through `release` when the owning payload is
/// discarded, or through `Drop` as a backstop.
#[derive(Debug)]
pub struct PlaybackResource {
    path: Option<PathBuf>,
}

impl PlaybackResource {
    fn create(payload: &AudioPayload) -> Option<Self> {
        let extension = payload
            .mime_type()
            .rsplit('/')
            .next()
            .unwrap_or("bin")
            .to_string();
        let path = std::env::temp_dir().join(format!(
            "echotext-{}.{}",
            uuid::Uuid::new_v4(),
            extension
        ));

        match fs::write(&path, payload.bytes()) {
            Ok(()) => {
                debug!("Created playback copy at {}", path.display());
                Some(Self { path: Some(path) })
            }
            Err(e) => {
                warn!("Failed to create playback copy: {}", e);
                None
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn release(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to release playback copy {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for PlaybackResource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Owner of the currently selected or recorded audio clip.
///
/// Replacing or clearing the payload always goes through the same routine,
/// which releases the prior playback resource before discarding the payload.
#[derive(Debug, Default)]
pub struct AudioSource {
    payload: Option<AudioPayload>,
    playback: Option<PlaybackResource>,
}

impl AudioSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current payload with a user-selected file
    pub fn set_from_file(&mut self, path: impl AsRef<Path>) -> Result<&AudioPayload, AudioError> {
        let payload = AudioPayload::from_file(path)?;
        Ok(self.install(payload))
    }

    /// Replace the current payload with a finalized recording
    pub fn set_from_recording(&mut self, payload: AudioPayload) -> &AudioPayload {
        self.install(payload)
    }

    /// Drop the current payload and release its playback resource
    pub fn clear(&mut self) {
        self.release_playback();
        self.payload = None;
    }

    pub fn payload(&self) -> Option<&AudioPayload> {
        self.payload.as_ref()
    }

    /// Path of the transient playback copy, if one could be created
    pub fn playback_path(&self) -> Option<&Path> {
        self.playback.as_ref().and_then(PlaybackResource::path)
    }

    // Single cleanup-and-replace path shared by selection and recording
    fn install(&mut self, payload: AudioPayload) -> &AudioPayload {
        self.release_playback();
        self.playback = PlaybackResource::create(&payload);
        self.payload.insert(payload)
    }

    fn release_playback(&mut self) {
        if let Some(mut playback) = self.playback.take() {
            playback.release();
        }
    }
}
