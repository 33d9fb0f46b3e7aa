pub mod device_probe;
pub mod whisper_cli_engine;
