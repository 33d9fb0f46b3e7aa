use crate::format::domain::output_format::OutputFormat;
use crate::format::domain::transcript_writer::TranscriptWriter;

use super::json_writer::JsonWriter;
use super::srt_writer::SrtWriter;
use super::text_writer::TextWriter;
use super::vtt_writer::VttWriter;

/// Creates the writer implementation for the requested output format.
pub fn create_writer(format: OutputFormat) -> Box<dyn TranscriptWriter> {
    match format {
        OutputFormat::Text => Box::new(TextWriter),
        OutputFormat::Srt => Box::new(SrtWriter),
        OutputFormat::Vtt => Box::new(VttWriter),
        OutputFormat::Json => Box::new(JsonWriter),
    }
}
