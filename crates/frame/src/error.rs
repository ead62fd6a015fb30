//! Error types for ofdmlink Frame

use thiserror::Error;

/// Frame processing error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid frame configuration: {msg}")]
    InvalidConfig { msg: String },

    #[error("Frame size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Core error: {0}")]
    Core(#[from] ofdmlink_core::CoreError),
}

/// Result type for ofdmlink Frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
