//! ofdmlink Modem - OFDM transceiver with pilot-aided equalization
//!
//! This crate turns pilot-grid frames into cyclic-prefixed time-domain
//! signals and back, estimates the per-subcarrier channel gain from the
//! pilots, and tracks that estimate across the frame.

pub mod common;
pub mod design;
pub mod equalizer;
pub mod ofdm;
pub mod transceiver;
pub mod error;

pub use error::{ModemError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        common::{Demodulator, Modulator, ReceivedSymbols},
        design::PilotDesignMatrices,
        equalizer::{ChannelEstimator, EqualizerMode, EqualizerState},
        ofdm::{OfdmDemodulator, OfdmModulator},
        transceiver::OfdmTransceiver,
        error::{ModemError, Result},
    };
}
