pub mod buffer2;
pub mod file_utils;
pub mod log_setup;
pub mod serde_format;

pub use buffer2::Buffer2;
