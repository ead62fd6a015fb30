//! Error types for ofdmlink Modem

use thiserror::Error;

/// Modem error types
#[derive(Error, Debug)]
pub enum ModemError {
    #[error("Unsupported equalizer mode: {name}")]
    UnsupportedEqualizer { name: String },

    #[error("Signal length {actual} is not a multiple of the OFDM symbol length {block}")]
    DimensionMismatch { block: usize, actual: usize },

    #[error("Invalid modem parameters: {msg}")]
    InvalidParameters { msg: String },

    #[error("Frame error: {0}")]
    Frame(#[from] ofdmlink_frame::FrameError),

    #[error("Core error: {0}")]
    Core(#[from] ofdmlink_core::CoreError),
}

/// Result type for ofdmlink Modem operations
pub type Result<T> = std::result::Result<T, ModemError>;
