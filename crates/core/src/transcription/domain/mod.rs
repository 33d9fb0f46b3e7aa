pub mod device;
pub mod engine;
pub mod model;
pub mod transcript;
