use std::fs;
use std::path::Path;

use crate::format::domain::transcript_writer::TranscriptWriter;
use crate::transcription::domain::transcript::TranscriptionResult;

/// Plain-text writer: the result's full text verbatim, no trailing
/// processing.
pub struct TextWriter;

impl TranscriptWriter for TextWriter {
    fn write(
        &self,
        result: &TranscriptionResult,
        output_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        fs::write(output_path, &result.text)?;
        Ok(())
    }
}
