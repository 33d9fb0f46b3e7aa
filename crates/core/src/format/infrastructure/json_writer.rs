use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::format::domain::transcript_writer::TranscriptWriter;
use crate::transcription::domain::transcript::TranscriptionResult;

/// Structured dump: the whole result serialized as pretty-printed JSON.
pub struct JsonWriter;

impl TranscriptWriter for JsonWriter {
    fn write(
        &self,
        result: &TranscriptionResult,
        output_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let file = BufWriter::new(File::create(output_path)?);
        serde_json::to_writer_pretty(file, result)?;
        Ok(())
    }
}
