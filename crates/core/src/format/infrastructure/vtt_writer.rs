use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::format::domain::transcript_writer::TranscriptWriter;
use crate::format::infrastructure::timestamp::format_timestamp;
use crate::transcription::domain::transcript::TranscriptionResult;

/// VTT (WebVTT) subtitle writer. Cues carry no index numbers.
pub struct VttWriter;

impl TranscriptWriter for VttWriter {
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
                format_timestamp(segment.start, '.')?,
                format_timestamp(segment.end, '.')?,
            ));
        }

        let mut file = BufWriter::new(File::create(output_path)?);

        writeln!(file, "WEBVTT")?;
        writeln!(file)?;

        for (segment, (start, end)) in result.segments.iter().zip(&cues) {
            writeln!(file, "{start} --> {end}")?;
            writeln!(file, "{}", segment.text.trim())?;
            writeln!(file)?;
        }

        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::domain::transcript::Segment;
    use std::fs;
    use tempfile::TempDir;

    fn segment(start: f64, end: f64, text: &str) -> Segment {
        Segment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_header_present_exactly_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.vtt");
        let result = TranscriptionResult {
            text: String::new(),
            segments: vec![segment(0.0, 1.5, " Hi "), segment(1.5, 3.0, "there")],
        };

        VttWriter.write(&result, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("WEBVTT\n\n"));
        assert_eq!(content.matches("WEBVTT").count(), 1);
    }

    #[test]
    fn test_cues_use_period_separator_and_no_index() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.vtt");
        let result = TranscriptionResult {
            text: String::new(),
            segments: vec![segment(0.0, 2.5, "Hello")],
        };

        VttWriter.write(&result, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "WEBVTT\n\n00:00:00.000 --> 00:00:02.500\nHello\n\n"
        );
    }

    #[test]
    fn test_negative_segment_time_fails_without_creating_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.vtt");
        let result = TranscriptionResult {
            text: String::new(),
            segments: vec![segment(0.0, 1.0, "fine"), segment(2.0, -3.0, "bad")],
        };

        assert!(VttWriter.write(&result, &path).is_err());
        // Not even the header is written
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_result_is_header_only() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.vtt");

        VttWriter
            .write(&TranscriptionResult::default(), &path)
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "WEBVTT\n\n");
    }
}
