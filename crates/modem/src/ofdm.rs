//! Orthogonal Frequency Division Multiplexing (OFDM) symbol transforms
//!
//! Transmit: each `N`-value subcarrier group goes through `ifft * sqrt(N)`
//! and gets the last `L` samples prepended as its cyclic prefix.
//! Receive: `(N + L)`-sample blocks lose their prefix and go through
//! `fft / sqrt(N)`. Without channel impairment the pair is exact up to
//! rounding.

use crate::common::{Demodulator, Modulator, ReceivedSymbols};
use crate::{ModemError, Result};
use ofdmlink_core::fft::FftProcessor;
use ofdmlink_core::{buffer, Complex};
use ofdmlink_frame::frame::Frame;
use ofdmlink_frame::FrameConfig;
use tracing::debug;

/// OFDM modulator
#[derive(Debug, Clone)]
pub struct OfdmModulator {
    config: FrameConfig,
    fft_processor: FftProcessor,
}

impl OfdmModulator {
    /// Create a new OFDM modulator
    pub fn new(config: FrameConfig, fft_processor: FftProcessor) -> Result<Self> {
        check_fft_size(&config, &fft_processor)?;
        Ok(Self {
            config,
            fft_processor,
        })
    }

    /// Add cyclic prefix
    fn add_cyclic_prefix(&self, ofdm_symbol: &[Complex], output: &mut Vec<Complex>) {
        let cp_start = ofdm_symbol.len() - self.config.cp_length();
        output.extend_from_slice(&ofdm_symbol[cp_start..]);
        output.extend_from_slice(ofdm_symbol);
    }
}

impl Modulator for OfdmModulator {
    fn modulate(&self, frame: &Frame, output: &mut Vec<Complex>) -> Result<()> {
        output.clear();

        let n = self.config.subcarriers();
        if frame.subcarriers() != n {
            return Err(ModemError::InvalidParameters {
                msg: format!("frame has {} subcarriers, modulator expects {}", frame.subcarriers(), n),
            });
        }

        output.reserve(frame.symbol_count() * self.config.symbol_length());
        let mut time_frame = buffer::zeros(n);
        for freq_frame in frame.symbols() {
            self.fft_processor.ifft_unitary(freq_frame, &mut time_frame)?;
            self.add_cyclic_prefix(&time_frame, output);
        }

        debug!(symbols = frame.symbol_count(), samples = output.len(), "modulated frame");
        Ok(())
    }

    fn samples_per_symbol(&self) -> usize {
        self.config.symbol_length()
    }
}

/// OFDM demodulator
#[derive(Debug, Clone)]
pub struct OfdmDemodulator {
    config: FrameConfig,
    fft_processor: FftProcessor,
}

impl OfdmDemodulator {
    /// Create a new OFDM demodulator
    pub fn new(config: FrameConfig, fft_processor: FftProcessor) -> Result<Self> {
        check_fft_size(&config, &fft_processor)?;
        Ok(Self {
            config,
            fft_processor,
        })
    }

    /// Remove cyclic prefix
    fn remove_cyclic_prefix<'a>(&self, received_symbol: &'a [Complex]) -> &'a [Complex] {
        &received_symbol[self.config.cp_length()..]
    }
}

impl Demodulator for OfdmDemodulator {
    fn demodulate(&self, samples: &[Complex]) -> Result<ReceivedSymbols> {
        let symbol_length = self.config.symbol_length();
        let blocks = buffer::blocks(samples, symbol_length).map_err(|_| {
            ModemError::DimensionMismatch {
                block: symbol_length,
                actual: samples.len(),
            }
        })?;

        let mut received = ReceivedSymbols::default();
        for block in blocks {
            let time_frame = self.remove_cyclic_prefix(block);

            let mut freq_frame = buffer::zeros(self.config.subcarriers());
            self.fft_processor.fft_unitary(time_frame, &mut freq_frame)?;

            received.time_domain.push(time_frame.to_vec());
            received.subcarriers.push(freq_frame);
        }

        debug!(samples = samples.len(), symbols = received.len(), "demodulated signal");
        Ok(received)
    }

    fn samples_per_symbol(&self) -> usize {
        self.config.symbol_length()
    }
}

fn check_fft_size(config: &FrameConfig, fft_processor: &FftProcessor) -> Result<()> {
    if fft_processor.size() != config.subcarriers() {
        return Err(ModemError::InvalidParameters {
            msg: format!(
                "FFT size {} does not match {} subcarriers",
                fft_processor.size(),
                config.subcarriers()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofdmlink_core::buffer::max_abs_diff;
    use ofdmlink_frame::DEFAULT_PILOT;

    fn pair(n: usize, l: usize) -> (OfdmModulator, OfdmDemodulator) {
        let config = FrameConfig::new(n, l, 4, 4, DEFAULT_PILOT).unwrap();
        let fft = FftProcessor::new(n).unwrap();
        (
            OfdmModulator::new(config, fft.clone()).unwrap(),
            OfdmDemodulator::new(config, fft).unwrap(),
        )
    }

    fn test_frame(n: usize, symbols: usize) -> Frame {
        let values = (0..n * symbols)
            .map(|i| Complex::new((i % 7) as f64 - 3.0, (i % 5) as f64 - 2.0))
            .collect();
        Frame::from_values(values, n).unwrap()
    }

    #[test]
    fn test_cyclic_prefix() {
        let (modulator, _) = pair(64, 16);
        let test_symbol: Vec<Complex> = (0..64).map(|i| Complex::new(i as f64, 0.0)).collect();
        let mut with_cp = Vec::new();
        modulator.add_cyclic_prefix(&test_symbol, &mut with_cp);

        assert_eq!(with_cp.len(), 80); // 64 + 16 CP

        // Check that CP contains last 16 samples
        for i in 0..16 {
            assert_eq!(with_cp[i], test_symbol[48 + i]);
        }
        assert_eq!(&with_cp[16..], &test_symbol[..]);
    }

    #[test]
    fn test_ofdm_modulation_length() {
        let (modulator, _) = pair(64, 8);
        let mut output = Vec::new();
        modulator.modulate(&test_frame(64, 3), &mut output).unwrap();
        assert_eq!(output.len(), 3 * 72);
        assert_eq!(output.len() % modulator.samples_per_symbol(), 0);
    }

    #[test]
    fn test_roundtrip_without_impairment() {
        let (modulator, demodulator) = pair(32, 4);
        let frame = test_frame(32, 5);
        let mut signal = Vec::new();
        modulator.modulate(&frame, &mut signal).unwrap();

        let received = demodulator.demodulate(&signal).unwrap();
        assert_eq!(received.len(), 5);
        for (index, observed) in received.subcarriers.iter().enumerate() {
            let sent = frame.symbol(index).unwrap();
            assert!(max_abs_diff(sent, observed).unwrap() < 1e-9);
        }
    }

    #[test]
    fn test_time_domain_excludes_prefix() {
        let (modulator, demodulator) = pair(16, 4);
        let frame = test_frame(16, 1);
        let mut signal = Vec::new();
        modulator.modulate(&frame, &mut signal).unwrap();

        let received = demodulator.demodulate(&signal).unwrap();
        assert_eq!(received.time_domain[0], signal[4..].to_vec());
    }

    #[test]
    fn test_demodulate_dimension_mismatch() {
        let (_, demodulator) = pair(16, 4);
        let result = demodulator.demodulate(&buffer::zeros(30));
        assert!(matches!(
            result,
            Err(ModemError::DimensionMismatch { block: 20, actual: 30 })
        ));
    }

    #[test]
    fn test_fft_size_must_match() {
        let config = FrameConfig::new(16, 4, 4, 4, DEFAULT_PILOT).unwrap();
        let fft = FftProcessor::new(32).unwrap();
        assert!(OfdmModulator::new(config, fft.clone()).is_err());
        assert!(OfdmDemodulator::new(config, fft).is_err());
    }
}
