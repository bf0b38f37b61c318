use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::io::Cursor;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::capture::{CaptureDevice, CaptureError};

enum Command {
    Stop,
}

/// Microphone capture over cpal.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated thread
/// that accumulates samples and encodes the whole take as a single WAV
/// fragment when told to stop.
pub struct MicrophoneDevice {
    control: Option<std_mpsc::Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl MicrophoneDevice {
    pub fn new() -> Self {
        Self {
            control: None,
            worker: None,
        }
    }

    fn spawn_capture_thread(
        fragments: mpsc::UnboundedSender<Vec<u8>>,
        commands: std_mpsc::Receiver<Command>,
        ready: std_mpsc::Sender<Result<(), CaptureError>>,
    ) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let host = cpal::default_host();
            let device = match host.default_input_device() {
                Some(device) => device,
                None => {
                    let _ = ready.send(Err(CaptureError::DeviceUnavailable(
                        "no default input device found".to_string(),
                    )));
                    return;
                }
            };

            let config = match device.default_input_config() {
                Ok(config) => config,
                Err(e) => {
                    let _ = ready.send(Err(CaptureError::PermissionDenied(format!(
                        "could not open the input device ({}); check microphone permissions",
                        e
                    ))));
                    return;
                }
            };

            let sample_rate = config.sample_rate().0;
            let channels = config.channels();
            let samples: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
            let buffer = Arc::clone(&samples);

            let stream = device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buffer) = buffer.lock() {
                        for &sample in data {
                            buffer.push((sample * i16::MAX as f32) as i16);
                        }
                    }
                },
                |err| {
                    warn!("Audio capture stream error: {}", err);
                },
                None,
            );

            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready.send(Err(CaptureError::PermissionDenied(format!(
                        "could not start the input stream ({}); check microphone permissions",
                        e
                    ))));
                    return;
                }
            };

            if let Err(e) = stream.play() {
                let _ = ready.send(Err(CaptureError::Stream(e.to_string())));
                return;
            }

            let _ = ready.send(Ok(()));

            // Block until stop (or the device handle being dropped)
            let _ = commands.recv();
            drop(stream);

            let samples = samples.lock().map(|s| s.clone()).unwrap_or_default();
            match encode_wav(&samples, sample_rate, channels) {
                Ok(wav) => {
                    info!(
                        "Recorded take finalized: {} samples, {} bytes WAV",
                        samples.len(),
                        wav.len()
                    );
                    let _ = fragments.send(wav);
                }
                Err(e) => warn!("Failed to encode recorded take: {}", e),
            }
            // Sender drops here, closing the fragment channel
        })
    }
}

impl Default for MicrophoneDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CaptureDevice for MicrophoneDevice {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, CaptureError> {
        let (fragment_tx, fragment_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();

        let worker = Self::spawn_capture_thread(fragment_tx, command_rx, ready_tx);

        // The capture thread reports back once the stream is running
        let started = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|e| CaptureError::Stream(e.to_string()))?
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        match started {
            Ok(()) => {
                self.control = Some(command_tx);
                self.worker = Some(worker);
                Ok(fragment_rx)
            }
            Err(e) => {
                let _ = worker.join();
                Err(e)
            }
        }
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if let Some(control) = self.control.take() {
            let _ = control.send(Command::Stop);
        }
        if let Some(worker) = self.worker.take() {
            tokio::task::spawn_blocking(move || {
                if worker.join().is_err() {
                    warn!("Capture thread panicked during shutdown");
                }
            })
            .await
            .map_err(|e| CaptureError::Stream(e.to_string()))?;
        }
        Ok(())
    }

    fn mime_type(&self) -> Option<String> {
        Some("audio/wav".to_string())
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
