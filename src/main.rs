use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use echotext::recorder::MicrophoneDevice;
use echotext::{
    Config, GeminiService, Recorder, SessionController, SessionState, StartOutcome,
    SystemClipboard, TranscriptionClient,
};

#[derive(Parser, Debug)]
#[command(name = "echotext", about = "Transcribe an audio clip to clean text")]
struct Args {
    /// Audio file to transcribe (mp3, wav, webm, ogg, or m4a)
    audio: Option<PathBuf>,

    /// Record from the default microphone for this many seconds instead of
    /// reading a file
    #[arg(long, value_name = "SECS", conflicts_with = "audio")]
    record: Option<u64>,

    /// Copy the transcript to the system clipboard when done
    #[arg(long)]
    copy: bool,

    /// Configuration file (TOML, extension optional)
    #[arg(long, default_value = "config/echotext")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("EchoText v{}", env!("CARGO_PKG_VERSION"));
    info!("Model: {} at {}", cfg.service.model, cfg.service.endpoint);

    let client = match GeminiService::from_config(&cfg) {
        Ok(service) => Some(Arc::new(TranscriptionClient::new(
            Arc::new(service),
            cfg.request_timeout(),
        ))),
        Err(e) => {
            warn!("{}; transcription will be unavailable", e);
            None
        }
    };

    let session = SessionController::new(client, Arc::new(SystemClipboard));

    match (&args.audio, args.record) {
        (Some(path), _) => {
            session
                .select_file(path)
                .await
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        (None, Some(secs)) => {
            let payload = record_clip(secs).await?;
            session.set_recording(payload).await;
        }
        (None, None) => bail!("provide an audio file or --record <SECS>"),
    }

    session.submit().await?;

    match session.state().await {
        SessionState::Error => {
            let message = session
                .last_error()
                .await
                .unwrap_or_else(|| "transcription failed".to_string());
            bail!(message);
        }
        _ => {
            println!("{}", session.transcript().await);
        }
    }

    if args.copy {
        session.copy_to_clipboard().await;
        if session.is_copied() {
            info!("Transcript copied to clipboard");
        }
    }

    Ok(())
}

async fn record_clip(secs: u64) -> Result<echotext::AudioPayload> {
    let mut recorder = Recorder::new(Box::new(MicrophoneDevice::new()));

    match recorder.start().await? {
        StartOutcome::Started => {}
        StartOutcome::Stopped(_) => bail!("recorder was already active"),
    }
    info!("Recording for {}s...", secs);

    tokio::time::sleep(Duration::from_secs(secs)).await;

    let payload = recorder.stop().await?;
    info!(
        "Captured {}s of audio ({} bytes)",
        recorder.elapsed_seconds(),
        payload.size_bytes()
    );

    Ok(payload)
}
