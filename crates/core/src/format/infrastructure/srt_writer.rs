use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::format::domain::transcript_writer::TranscriptWriter;
use crate::format::infrastructure::timestamp::format_timestamp;
use crate::transcription::domain::transcript::TranscriptionResult;

/// SRT (SubRip) subtitle writer.
///
/// Indices are 1-based and sequential regardless of gaps or overlaps in
/// segment times.
pub struct SrtWriter;

impl TranscriptWriter for SrtWriter {
    fn write(
        &self,
        result: &TranscriptionResult,
        output_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Format every timestamp up front; a bad segment must not leave a
        // truncated file behind
        let mut cues = Vec::with_capacity(result.segments.len());
        for segment in &result.segments {
            cues.push((
                format_timestamp(segment.start, ',')?,
                format_timestamp(segment.end, ',')?,
            ));
        }

        let mut file = BufWriter::new(File::create(output_path)?);

        for (i, (segment, (start, end))) in result.segments.iter().zip(&cues).enumerate() {
            writeln!(file, "{}", i + 1)?;
            writeln!(file, "{start} --> {end}")?;
            writeln!(file, "{}", segment.text.trim())?;
            writeln!(file)?;
        }

        file.flush()?;
        Ok(())
    }
}
