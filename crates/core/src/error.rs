//! Error types for ofdmlink Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Sample count {actual} is not a multiple of block length {block}")]
    BlockMisaligned { block: usize, actual: usize },

    #[error("FFT error: {msg}")]
    FftError { msg: String },

    #[error("Linear algebra error: {msg}")]
    LinAlg { msg: String },
}

/// Result type for ofdmlink Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
