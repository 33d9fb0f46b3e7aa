use std::path::Path;

use super::device::Device;
use super::transcript::TranscriptionResult;

/// Per-invocation parameters handed to the inference engine. The model file
/// itself is fixed at engine construction so a batch loads it only once.
#[derive(Clone, Debug)]
pub struct TranscribeOptions {
    pub device: Device,
    pub language: Option<String>,
}

/// Domain interface for the external speech-to-text capability.
///
/// Implementations are potentially long-running (seconds to minutes per
/// call) and must not be assumed to support cancellation internally; callers
/// cancel between files, never mid-call.
pub trait InferenceEngine: Send {
    fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<TranscriptionResult, Box<dyn std::error::Error + Send + Sync>>;
}
