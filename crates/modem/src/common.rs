//! Common modulation traits and types

use crate::Result;
use ofdmlink_core::Complex;
use ofdmlink_frame::frame::Frame;

/// Generic modulator trait
pub trait Modulator {
    /// Modulate a subcarrier-domain frame to time-domain samples
    fn modulate(&self, frame: &Frame, output: &mut Vec<Complex>) -> Result<()>;

    /// Time-domain samples per OFDM symbol
    fn samples_per_symbol(&self) -> usize;
}

/// Generic demodulator trait
pub trait Demodulator {
    /// Recover per-symbol observations from time-domain samples
    fn demodulate(&self, samples: &[Complex]) -> Result<ReceivedSymbols>;

    /// Time-domain samples per OFDM symbol
    fn samples_per_symbol(&self) -> usize;
}

/// Observations of one received signal, one entry per OFDM symbol
#[derive(Debug, Clone, Default)]
pub struct ReceivedSymbols {
    /// Time-domain samples with the cyclic prefix removed
    pub time_domain: Vec<Vec<Complex>>,
    /// Subcarrier-domain values after the forward transform
    pub subcarriers: Vec<Vec<Complex>>,
}

impl ReceivedSymbols {
    /// Number of OFDM symbols
    pub fn len(&self) -> usize {
        self.subcarriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subcarriers.is_empty()
    }
}
