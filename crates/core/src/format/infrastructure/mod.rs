pub mod json_writer;
pub mod srt_writer;
pub mod text_writer;
pub mod timestamp;
pub mod vtt_writer;
pub mod writer_factory;
