use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::transcription::domain::device::Device;
use crate::transcription::domain::engine::{InferenceEngine, TranscribeOptions};
use crate::transcription::domain::transcript::{Segment, TranscriptionResult};

type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Inference engine backed by the whisper.cpp CLI sidecar.
///
/// Spawns `whisper-cli` per file with JSON output into a scratch directory
/// and parses the result. The sidecar does its own audio decoding, so any
/// container it understands works here without this crate touching samples.
pub struct WhisperCliEngine {
    binary: PathBuf,
    model_path: PathBuf,
}

impl WhisperCliEngine {
    pub fn new(binary: impl Into<PathBuf>, model_path: &Path) -> Result<Self, EngineError> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        Ok(Self {
            binary: binary.into(),
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl InferenceEngine for WhisperCliEngine {
    fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<TranscriptionResult, EngineError> {
        // Scratch dir for the sidecar's JSON so nothing but the final output
        // is ever created beside the input.
        let scratch = tempfile::tempdir()
            .map_err(|e| format!("Failed to create scratch directory: {e}"))?;
        let out_base = scratch.path().join("transcript");

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(audio_path)
            .arg("-oj")
            .arg("-of")
            .arg(&out_base)
            .arg("-np");
        if let Some(ref language) = options.language {
            cmd.arg("-l").arg(language);
        }
        if options.device == Device::Cpu {
            cmd.arg("--no-gpu");
        }

        log::debug!(
            "Running {} on {} (device: {})",
            self.binary.display(),
            audio_path.display(),
            options.device
        );
        let output = cmd
            .output()
            .map_err(|e| format!("Failed to run {}: {e}", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("Whisper failed: {}", stderr.trim()).into());
        }

        let json_path = out_base.with_extension("json");
        let raw = fs::read_to_string(&json_path)
            .map_err(|e| format!("Whisper produced no JSON output: {e}"))?;
        parse_output(&raw)
    }
}

#[derive(Deserialize)]
struct WhisperOutput {
    transcription: Vec<WhisperSegment>,
}

#[derive(Deserialize)]
struct WhisperSegment {
    offsets: WhisperOffsets,
    text: String,
}

#[derive(Deserialize)]
struct WhisperOffsets {
    from: u64,
    to: u64,
}

/// Parse whisper.cpp `-oj` output. Offsets are milliseconds.
fn parse_output(raw: &str) -> Result<TranscriptionResult, EngineError> {
    let doc: WhisperOutput =
        serde_json::from_str(raw).map_err(|e| format!("Unexpected whisper JSON: {e}"))?;

    let mut text = String::new();
    let mut segments = Vec::with_capacity(doc.transcription.len());
    for item in doc.transcription {
        text.push_str(&item.text);
        segments.push(Segment {
            start: item.offsets.from as f64 / 1000.0,
            end: item.offsets.to as f64 / 1000.0,
            text: item.text,
        });
    }

    Ok(TranscriptionResult { text, segments })
}
