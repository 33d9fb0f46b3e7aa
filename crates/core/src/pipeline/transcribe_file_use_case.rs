use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::format::domain::output_format::OutputFormat;
use crate::format::domain::transcript_writer::TranscriptWriter;
use crate::transcription::domain::engine::{InferenceEngine, TranscribeOptions};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("transcription failed for {path}: {message}")]
    Inference { path: PathBuf, message: String },
    #[error("could not write output {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("cancelled before writing output")]
    Cancelled,
}

/// Single-file pipeline: invoke the inference engine, then serialize the
/// result beside the input as `<stem>.<format-extension>`.
///
/// Holds the engine for its whole lifetime so a batch loads the model once
/// and reuses it per file. With a cancel token attached, cancellation is
/// honored at the checkpoint between inference and writing; an in-flight
/// inference call itself is never interrupted.
pub struct TranscribeFileUseCase {
    engine: Box<dyn InferenceEngine>,
    writer: Box<dyn TranscriptWriter>,
    options: TranscribeOptions,
    format: OutputFormat,
    cancelled: Option<Arc<AtomicBool>>,
}

impl TranscribeFileUseCase {
    pub fn new(
        engine: Box<dyn InferenceEngine>,
        writer: Box<dyn TranscriptWriter>,
        options: TranscribeOptions,
        format: OutputFormat,
    ) -> Self {
        Self {
            engine,
            writer,
            options,
            format,
            cancelled: None,
        }
    }

    pub fn with_cancel_token(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    /// Transcribe one file and return the path of the written output.
    pub fn run(&self, input: &Path) -> Result<PathBuf, PipelineError> {
        let result = self
            .engine
            .transcribe(input, &self.options)
            .map_err(|e| PipelineError::Inference {
                path: input.to_path_buf(),
                message: e.to_string(),
            })?;

        if let Some(ref cancelled) = self.cancelled {
            if cancelled.load(Ordering::Relaxed) {
                return Err(PipelineError::Cancelled);
            }
        }

        let output = input.with_extension(self.format.extension());
        self.writer
            .write(&result, &output)
            .map_err(|e| PipelineError::Write {
                path: output.clone(),
                message: e.to_string(),
            })?;

        log::info!("Transcription saved to {}", output.display());
        Ok(output)
    }
}
