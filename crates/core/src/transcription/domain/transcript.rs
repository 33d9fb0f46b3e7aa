use serde::Serialize;

/// One timed span of transcribed text within a result.
///
/// Segments arrive ordered by start time as produced by the inference
/// engine; formatters must preserve that order. Text may carry the engine's
/// surrounding whitespace, trimmed only on subtitle output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Full output of one inference run: concatenated text plus ordered segments.
/// Immutable once produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub segments: Vec<Segment>,
}
