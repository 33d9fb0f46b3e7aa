pub mod format;
pub mod pipeline;
pub mod shared;
pub mod transcription;
