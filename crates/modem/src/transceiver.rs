//! Encode/decode facade over framing, OFDM and equalization

use crate::common::{Demodulator, Modulator};
use crate::equalizer::{ChannelEstimator, EqualizerMode, EqualizerState};
use crate::ofdm::{OfdmDemodulator, OfdmModulator};
use crate::Result;
use ofdmlink_core::fft::FftProcessor;
use ofdmlink_core::Complex;
use ofdmlink_frame::frame::{Frame, FrameBuilder, FrameExtractor};
use ofdmlink_frame::grid::PilotGrid;
use ofdmlink_frame::FrameConfig;
use tracing::debug;

/// One OFDM link end: frames, modulates, demodulates and equalizes
///
/// Everything inside is derived once in [`new`](Self::new) and read-only
/// afterwards. A transceiver can be shared by reference between threads;
/// every [`decode`](Self::decode) allocates its own equalizer state.
#[derive(Debug, Clone)]
pub struct OfdmTransceiver {
    config: FrameConfig,
    grid: PilotGrid,
    builder: FrameBuilder,
    extractor: FrameExtractor,
    modulator: OfdmModulator,
    demodulator: OfdmDemodulator,
    estimator: ChannelEstimator,
}

impl OfdmTransceiver {
    /// Create a transceiver for `config`, deriving its design matrices
    pub fn new(config: FrameConfig) -> Result<Self> {
        let fft_processor = FftProcessor::new(config.subcarriers())?;

        Ok(Self {
            config,
            grid: PilotGrid::new(config),
            builder: FrameBuilder::new(config),
            extractor: FrameExtractor::new(config),
            modulator: OfdmModulator::new(config, fft_processor.clone())?,
            demodulator: OfdmDemodulator::new(config, fft_processor.clone())?,
            estimator: ChannelEstimator::new(config, fft_processor)?,
        })
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn estimator(&self) -> &ChannelEstimator {
        &self.estimator
    }

    /// Frame `data` with the pilot grid and modulate it to a time-domain
    /// signal
    pub fn encode(&self, data: &[Complex]) -> Result<Vec<Complex>> {
        let frame = self.builder.build(data)?;
        let mut signal = Vec::new();
        self.modulator.modulate(&frame, &mut signal)?;
        Ok(signal)
    }

    /// Demodulate and equalize `signal`, then strip the pilot grid.
    ///
    /// Returns at most `max_len` recovered data symbols when given.
    pub fn decode(
        &self,
        signal: &[Complex],
        mode: EqualizerMode,
        max_len: Option<usize>,
    ) -> Result<Vec<Complex>> {
        let equalized = self.equalize(signal, mode)?;
        Ok(self.extractor.extract(&equalized, max_len)?)
    }

    /// Demodulate `signal` and equalize every OFDM symbol, pilots included
    pub fn equalize(&self, signal: &[Complex], mode: EqualizerMode) -> Result<Frame> {
        let received = self.demodulator.demodulate(signal)?;
        let n = self.config.subcarriers();

        let (Some(first_time), Some(first_freq)) =
            (received.time_domain.first(), received.subcarriers.first())
        else {
            return Ok(Frame::from_values(Vec::new(), n)?);
        };

        let mut state = EqualizerState::initialize(&self.estimator, mode, first_time, first_freq)?;

        let mut values = Vec::with_capacity(received.len() * n);
        for (index, observed) in received.subcarriers.iter().enumerate() {
            if index > 0 && self.grid.is_pilot_symbol(index) {
                state.track(&self.estimator, observed)?;
            }
            values.extend(state.equalize(observed));
        }

        debug!(
            %mode,
            symbols = received.len(),
            pilot_updates = state.pilot_updates(),
            "equalized signal"
        );

        Ok(Frame::from_values(values, n)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModemError;
    use ofdmlink_core::buffer::max_abs_diff;
    use ofdmlink_frame::DEFAULT_PILOT;

    fn transceiver(n: usize, l: usize, t: usize, f: usize) -> OfdmTransceiver {
        OfdmTransceiver::new(FrameConfig::new(n, l, t, f, DEFAULT_PILOT).unwrap()).unwrap()
    }

    fn data(len: usize) -> Vec<Complex> {
        (0..len)
            .map(|i| Complex::new((i % 4) as f64 - 1.5, ((i / 4) % 4) as f64 - 1.5))
            .collect()
    }

    /// Circular convolution per OFDM symbol, valid while taps fit in the prefix
    fn dispersive_channel(signal: &[Complex], taps: &[Complex]) -> Vec<Complex> {
        (0..signal.len())
            .map(|i| {
                taps.iter()
                    .enumerate()
                    .filter(|&(d, _)| d <= i)
                    .map(|(d, &h)| h * signal[i - d])
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_roundtrip_no_equalizer() {
        let link = transceiver(64, 8, 4, 4);
        let sent = data(300);
        let signal = link.encode(&sent).unwrap();
        let received = link.decode(&signal, EqualizerMode::None, Some(sent.len())).unwrap();
        assert_eq!(received.len(), sent.len());
        assert!(max_abs_diff(&sent, &received).unwrap() < 1e-9);
    }

    #[test]
    fn test_signal_length() {
        let link = transceiver(64, 8, 4, 4);
        // 141 data slots per period, 142 symbols need two periods
        let signal = link.encode(&data(142)).unwrap();
        assert_eq!(signal.len(), 2 * 4 * 72);
    }

    #[test]
    fn test_decode_without_limit_returns_tail_fill() {
        let link = transceiver(16, 4, 3, 4);
        let sent = data(5);
        let signal = link.encode(&sent).unwrap();
        let received = link.decode(&signal, EqualizerMode::None, None).unwrap();
        assert_eq!(received.len(), link.config().data_capacity_per_period());
        assert!(max_abs_diff(&sent, &received[..5]).unwrap() < 1e-9);
        assert!(received[5..].iter().all(|&v| (v - DEFAULT_PILOT).norm() < 1e-9));
    }

    #[test]
    fn test_naive_and_lmmse_undo_static_channel_before_first_update() {
        // a single pilot period never reaches the re-estimation path
        let link = transceiver(64, 8, 8, 4);
        let sent = data(200);
        let signal = link.encode(&sent).unwrap();
        let taps = [Complex::new(0.9, 0.1), Complex::new(0.3, -0.2), Complex::new(0.0, 0.1)];
        let distorted = dispersive_channel(&signal, &taps);

        let plain = link.decode(&distorted, EqualizerMode::None, Some(sent.len())).unwrap();
        assert!(max_abs_diff(&sent, &plain).unwrap() > 0.1);

        for mode in [EqualizerMode::Naive, EqualizerMode::Lmmse] {
            let received = link.decode(&distorted, mode, Some(sent.len())).unwrap();
            assert!(max_abs_diff(&sent, &received).unwrap() < 1e-8, "{}", mode);
        }
    }

    #[test]
    fn test_naive_tracks_flat_channel_change() {
        let link = transceiver(32, 4, 3, 4);
        let sent = data(100);
        let signal = link.encode(&sent).unwrap();

        // flat gain that changes from the second period on
        let symbol_len = link.config().symbol_length();
        let period_len = 3 * symbol_len;
        let distorted: Vec<Complex> = signal
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                if i < period_len {
                    s * Complex::new(0.8, 0.0)
                } else {
                    s * Complex::new(0.0, 1.2)
                }
            })
            .collect();

        let received = link.decode(&distorted, EqualizerMode::Naive, Some(sent.len())).unwrap();
        assert!(max_abs_diff(&sent, &received).unwrap() < 1e-9);
    }

    #[test]
    fn test_equalized_frame_shape() {
        let link = transceiver(32, 4, 3, 4);
        let signal = link.encode(&data(80)).unwrap();
        let frame = link.equalize(&signal, EqualizerMode::Lmmse).unwrap();
        assert_eq!(frame.subcarriers(), 32);
        assert_eq!(frame.symbol_count(), signal.len() / link.config().symbol_length());
    }

    #[test]
    fn test_empty_signal() {
        let link = transceiver(32, 4, 3, 4);
        assert!(link.encode(&[]).unwrap().is_empty());
        let received = link.decode(&[], EqualizerMode::Lmmse, Some(10)).unwrap();
        assert!(received.is_empty());
    }

    #[test]
    fn test_misaligned_signal() {
        let link = transceiver(32, 4, 3, 4);
        let mut signal = link.encode(&data(10)).unwrap();
        signal.pop();
        assert!(matches!(
            link.decode(&signal, EqualizerMode::None, None),
            Err(ModemError::DimensionMismatch { block: 36, .. })
        ));
    }

    #[test]
    fn test_shared_between_threads() {
        let link = transceiver(32, 4, 3, 4);
        let sent = data(120);
        let signal = link.encode(&sent).unwrap();
        let (link, signal, limit) = (&link, &signal, sent.len());

        std::thread::scope(|scope| {
            let handles: Vec<_> = EqualizerMode::ALL
                .iter()
                .map(|&mode| scope.spawn(move || link.decode(signal, mode, Some(limit))))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().unwrap().len(), sent.len());
            }
        });
    }
}
