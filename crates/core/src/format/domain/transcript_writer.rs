use std::path::Path;

use crate::transcription::domain::transcript::TranscriptionResult;

/// Domain interface for serializing a transcription result to a file.
///
/// Implementations create or overwrite the file at `output_path` and must
/// preserve segment order as produced by the inference engine.
pub trait TranscriptWriter: Send {
    fn write(
        &self,
        result: &TranscriptionResult,
        output_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
