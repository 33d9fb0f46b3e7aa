use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use voxscribe_core::format::domain::output_format::OutputFormat;
use voxscribe_core::pipeline::job::{JobState, TranscriptionRequest};
use voxscribe_core::pipeline::orchestrator::{TranscriptionOrchestrator, WorkerEvent};
use voxscribe_core::shared::model_resolver;
use voxscribe_core::transcription::domain::device::DevicePreference;
use voxscribe_core::transcription::domain::engine::InferenceEngine;
use voxscribe_core::transcription::domain::model::ModelSize;
use voxscribe_core::transcription::infrastructure::whisper_cli_engine::WhisperCliEngine;

mod interactive;

/// Audio transcription for single files and directories of audio files.
#[derive(Parser)]
#[command(name = "voxscribe")]
struct Cli {
    /// Audio file or directory to transcribe (omit for interactive mode).
    input: Option<PathBuf>,

    /// Whisper model size: tiny, base, small, medium, large.
    #[arg(long, default_value = "base")]
    model: String,

    /// Output format: txt, srt, vtt, json.
    #[arg(long, default_value = "txt")]
    format: String,

    /// Spoken language hint (e.g. "en"); auto-detected when omitted.
    #[arg(long)]
    language: Option<String>,

    /// Inference device: auto, cpu, cuda.
    #[arg(long, default_value = "auto")]
    device: String,

    /// Path to the whisper.cpp CLI binary.
    #[arg(long, default_value = "whisper-cli")]
    whisper_binary: PathBuf,

    /// Start the interactive prompt instead of a one-shot run.
    #[arg(long)]
    interactive: bool,
}

/// Resolved run configuration, shared by one-shot and interactive modes.
pub(crate) struct Settings {
    pub model: ModelSize,
    pub format: OutputFormat,
    pub language: Option<String>,
    pub device: DevicePreference,
    pub whisper_binary: PathBuf,
}

impl Settings {
    pub fn request(&self, input: PathBuf) -> TranscriptionRequest {
        TranscriptionRequest {
            input,
            model: self.model,
            format: self.format,
            language: self.language.clone(),
            device: self.device,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = Settings {
        model: cli.model.parse()?,
        format: cli.format.parse()?,
        language: cli.language,
        device: cli.device.parse()?,
        whisper_binary: cli.whisper_binary,
    };

    match cli.input {
        Some(input) if !cli.interactive => run_once(&settings, input),
        _ => interactive::run(settings),
    }
}

fn run_once(settings: &Settings, input: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input not found: {}", input.display()).into());
    }

    let engine = build_engine(settings)?;
    let mut orchestrator = TranscriptionOrchestrator::new();
    let events = orchestrator.start(settings.request(input), engine)?;

    loop {
        match events.recv_timeout(Duration::from_millis(200)) {
            Ok(WorkerEvent::Status(message)) => eprintln!("{message}"),
            Ok(WorkerEvent::FileDone(output)) => eprintln!("Saved {}", output.display()),
            Ok(WorkerEvent::FileFailed(path, message)) => {
                eprintln!("Failed {}: {message}", path.display());
            }
            Ok(WorkerEvent::Complete | WorkerEvent::Cancelled | WorkerEvent::Failed(_)) => break,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                let job = orchestrator.snapshot();
                eprint!("\r{:5.1}%  {}", job.progress, job.message);
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }
    eprintln!();

    let job = orchestrator.snapshot();
    match job.state {
        JobState::Completed => {
            // A batch where every file failed still exits non-zero
            if job.outputs.is_empty() && !job.errors.is_empty() {
                return Err(format!("All {} files failed to transcribe", job.errors.len()).into());
            }
            log::info!(
                "Done: {} output(s), {} error(s)",
                job.outputs.len(),
                job.errors.len()
            );
            Ok(())
        }
        JobState::Cancelled => Err("Transcription was cancelled".into()),
        _ => Err(job
            .log
            .last()
            .cloned()
            .unwrap_or_else(|| "Transcription failed".to_string())
            .into()),
    }
}

/// Resolve the model (downloading on first use) and wrap the sidecar binary.
pub(crate) fn build_engine(
    settings: &Settings,
) -> Result<Box<dyn InferenceEngine>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {}", settings.model);
    let model_path =
        model_resolver::resolve(settings.model, None, Some(Box::new(download_progress)))?;
    eprintln!();

    Ok(Box::new(
        WhisperCliEngine::new(&settings.whisper_binary, &model_path)
            .map_err(|e| -> Box<dyn std::error::Error> { e })?,
    ))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading whisper model... {pct}%");
    } else {
        eprint!("\rDownloading whisper model... {downloaded} bytes");
    }
}
