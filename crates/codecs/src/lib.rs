//! ofdmlink Codecs - Constellation mappers
//!
//! Maps symbol indices to complex constellation points and back, so a
//! stream of indices can ride on the subcarriers of an OFDM frame.

pub mod constellation;
pub mod qam;
pub mod error;

pub use error::{CodecError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        constellation::{bit_errors, ConstellationCodec, ConstellationKind},
        qam::Qam16,
        error::{CodecError, Result},
    };
}
