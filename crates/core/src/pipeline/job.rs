use std::path::PathBuf;

use crate::format::domain::output_format::OutputFormat;
use crate::transcription::domain::device::DevicePreference;
use crate::transcription::domain::model::ModelSize;

/// Immutable description of one transcription run, single file or directory.
#[derive(Clone, Debug)]
pub struct TranscriptionRequest {
    pub input: PathBuf,
    pub model: ModelSize,
    pub format: OutputFormat,
    pub language: Option<String>,
    pub device: DevicePreference,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Failed
        )
    }
}

/// Mutable record of the active job.
///
/// Owned exclusively by the orchestrator; the worker thread is the sole
/// mutator of everything except `progress`, which the ticker thread also
/// advances. Callers only ever see cloned snapshots.
#[derive(Clone, Debug)]
pub struct Job {
    pub state: JobState,
    /// 0–100, monotonic non-decreasing while running.
    pub progress: f64,
    /// Human-readable status line.
    pub message: String,
    /// Output files produced so far.
    pub outputs: Vec<PathBuf>,
    /// Per-file errors (batch mode only), keyed by input path.
    pub errors: Vec<(PathBuf, String)>,
    /// Append-only activity log for the interactive surface.
    pub log: Vec<String>,
}

impl Job {
    pub fn new() -> Self {
        Self {
            state: JobState::Idle,
            progress: 0.0,
            message: "Ready".to_string(),
            outputs: Vec::new(),
            errors: Vec::new(),
            log: Vec::new(),
        }
    }

    pub(crate) fn log_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::info!("{line}");
        self.log.push(line);
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}
