use std::fs;
use std::path::Path;
use thiserror::Error;

/// MIME type assigned to recorded clips whose capture device reports none
pub const DEFAULT_RECORDING_MIME: &str = "audio/webm";

/// Provenance label for payloads produced by the recorder
pub const RECORDING_LABEL: &str = "recording";

/// Audio file extensions accepted for selection, mapped to their MIME types
const ACCEPTED_EXTENSIONS: &[(&str, &str)] = &[
    ("mp3", "audio/mp3"),
    ("wav", "audio/wav"),
    ("webm", "audio/webm"),
    ("ogg", "audio/ogg"),
    ("m4a", "audio/m4a"),
];

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("unsupported audio format: {0} (expected mp3, wav, webm, ogg, or m4a)")]
    UnsupportedFormat(String),

    #[error("failed to read audio file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// A single binary audio clip with its MIME type and provenance.
///
/// Payloads are immutable once created; a new selection or recording replaces
/// the previous payload wholesale.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    bytes: Vec<u8>,
    mime_type: String,
    source_label: String,
}

impl AudioPayload {
    /// Build a payload from a user-selected file.
    ///
    /// Only the extension is checked; no duration or size limits are applied.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let path = path.as_ref();

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let mime_type = ACCEPTED_EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| (*mime).to_string())
            .ok_or_else(|| AudioError::UnsupportedFormat(path.display().to_string()))?;

        let bytes = fs::read(path).map_err(|source| AudioError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let source_label = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio file")
            .to_string();

        Ok(Self {
            bytes,
            mime_type,
            source_label,
        })
    }

    /// Build a payload from a finalized recording.
    ///
    /// Falls back to `audio/webm` when the capture device reports no type.
    pub fn from_recording(bytes: Vec<u8>, mime_type: Option<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.unwrap_or_else(|| DEFAULT_RECORDING_MIME.to_string()),
            source_label: RECORDING_LABEL.to_string(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }
}
