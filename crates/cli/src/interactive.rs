use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use voxscribe_core::pipeline::job::JobState;
use voxscribe_core::pipeline::orchestrator::{StartError, TranscriptionOrchestrator};

use crate::Settings;

const HELP: &str = "\
Commands:
  start <path>         transcribe a file or directory
  status               show the current job
  log                  show the job activity log
  cancel               cancel the running job
  set                  show current settings
  set <key> <value>    change model, format, language, device or binary
  help                 this text
  quit                 exit (cancels a running job)";

/// Terminal prompt over the orchestrator. Commands return immediately;
/// transcription runs on the worker thread and is inspected via `status`.
pub(crate) fn run(mut settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut orchestrator = TranscriptionOrchestrator::new();
    println!("voxscribe interactive mode. Type 'help' for commands.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or("");
        let rest = parts.next().map(str::trim).unwrap_or("");

        match command {
            "" => {}
            "help" => println!("{HELP}"),
            "start" => cmd_start(&mut orchestrator, &settings, rest),
            "status" => cmd_status(&orchestrator),
            "log" => {
                for entry in orchestrator.snapshot().log {
                    println!("{entry}");
                }
            }
            "cancel" => {
                if orchestrator.snapshot().state == JobState::Running {
                    orchestrator.cancel();
                    println!("Cancellation requested; the current file will finish first.");
                } else {
                    println!("No job is running.");
                }
            }
            "set" => cmd_set(&mut settings, rest),
            "quit" | "exit" => {
                orchestrator.cancel();
                break;
            }
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }

    Ok(())
}

fn cmd_start(orchestrator: &mut TranscriptionOrchestrator, settings: &Settings, path: &str) {
    if path.is_empty() {
        println!("Usage: start <path>");
        return;
    }

    let engine = match crate::build_engine(settings) {
        Ok(engine) => engine,
        Err(e) => {
            println!("Could not prepare the engine: {e}");
            return;
        }
    };

    match orchestrator.start(settings.request(PathBuf::from(path)), engine) {
        Ok(_) => println!("Transcription started. Use 'status' to follow progress."),
        Err(StartError::AlreadyRunning) => {
            println!("A job is already running; cancel it or wait for it to finish.");
        }
        Err(StartError::InvalidInput(input)) => {
            println!("Input not found: {}", input.display());
        }
    }
}

fn cmd_status(orchestrator: &TranscriptionOrchestrator) {
    let job = orchestrator.snapshot();
    let state = match job.state {
        JobState::Idle => "idle",
        JobState::Running => "running",
        JobState::Completed => "completed",
        JobState::Cancelled => "cancelled",
        JobState::Failed => "failed",
    };
    println!("{state}  {:5.1}%  {}", job.progress, job.message);
    for output in &job.outputs {
        println!("  saved {}", output.display());
    }
    for (path, message) in &job.errors {
        println!("  failed {}: {message}", path.display());
    }
}

fn cmd_set(settings: &mut Settings, rest: &str) {
    if rest.is_empty() {
        println!("model    = {}", settings.model);
        println!("format   = {}", settings.format);
        println!(
            "language = {}",
            settings.language.as_deref().unwrap_or("(auto)")
        );
        println!("device   = {}", settings.device);
        println!("binary   = {}", settings.whisper_binary.display());
        return;
    }

    let mut parts = rest.splitn(2, char::is_whitespace);
    let key = parts.next().unwrap_or("");
    let value = parts.next().map(str::trim).unwrap_or("");
    if value.is_empty() {
        println!("Usage: set <key> <value>");
        return;
    }

    let outcome = match key {
        "model" => value.parse().map(|v| settings.model = v),
        "format" => value.parse().map(|v| settings.format = v),
        "device" => value.parse().map(|v| settings.device = v),
        "language" => {
            settings.language = if value == "auto" {
                None
            } else {
                Some(value.to_string())
            };
            Ok(())
        }
        "binary" => {
            settings.whisper_binary = PathBuf::from(value);
            Ok(())
        }
        other => Err(format!(
            "Unknown setting '{other}'. Keys: model, format, language, device, binary."
        )),
    };

    match outcome {
        Ok(()) => println!("{key} set."),
        Err(message) => println!("{message}"),
    }
}
