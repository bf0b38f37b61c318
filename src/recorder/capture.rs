use thiserror::Error;
use tokio::sync::mpsc;

/// Failures caused by the environment denying or losing the capture device,
/// as opposed to network/service failures elsewhere in the pipeline
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("microphone access was denied: {0}")]
    PermissionDenied(String),

    #[error("no usable audio input device: {0}")]
    DeviceUnavailable(String),

    #[error("audio capture stream failed: {0}")]
    Stream(String),
}

/// Audio capture device trait.
///
/// `start` hands back a channel receiver on which the device delivers binary
/// audio fragments in arrival order. The device drops its sender when the
/// capture is fully stopped, which closes the channel.
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Begin capturing; fails without entering a capturing state when the
    /// device is unavailable or permission is denied
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, CaptureError>;

    /// Stop capturing and flush any remaining fragments to the channel
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// MIME type of the emitted fragments, if the device knows it
    fn mime_type(&self) -> Option<String>;

    /// Device name for logging
    fn name(&self) -> &str;
}
