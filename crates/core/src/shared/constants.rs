/// Extensions the batch runner accepts, lowercase.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac", "ogg"];

pub const WHISPER_MODEL_BASE_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Tick interval for the heuristic progress estimator.
pub const PROGRESS_TICK_MS: u64 = 100;

/// Ceiling for estimated progress while a job is still running.
/// Only a confirmed terminal success may report 100.
pub const PROGRESS_CEILING: f64 = 95.0;
