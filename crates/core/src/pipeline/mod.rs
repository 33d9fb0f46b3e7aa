pub mod batch_runner;
pub mod job;
pub mod orchestrator;
pub mod progress_estimator;
pub mod transcribe_file_use_case;
