//! Error types for ofdmlink Codecs

use thiserror::Error;

/// Codec error types
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Symbol index {index} outside alphabet of {alphabet}")]
    SymbolOutOfRange { index: usize, alphabet: usize },

    #[error("Unsupported constellation: {name}")]
    UnsupportedConstellation { name: String },

    #[error("Length mismatch: {expected} symbols sent, {actual} received")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Result type for ofdmlink Codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
