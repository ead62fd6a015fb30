//! Multipath and AWGN channel model
//!
//! Dispersion draws one gain `g ~ N(0, 0.25^2)` per transmission and
//! applies the exponentially decaying impulse response `[1, g, g^2, ...]`
//! of `D` taps as a linear convolution, computed with zero-padded FFTs of
//! length `len + D` and truncated back to the input length.
//!
//! Noise is complex Gaussian with per-component standard deviation
//! `10^(-snr/20) / sqrt(2 * bits_per_symbol)`.

use anyhow::{Context, Result};
use ofdmlink_core::fft::FftProcessor;
use ofdmlink_core::Complex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, StandardNormal};
use tracing::trace;

/// Standard deviation of the per-transmission path gain
pub const PATH_GAIN_STD: f64 = 0.25;

/// Random multipath/noise channel with its own generator
#[derive(Debug, Clone)]
pub struct Channel {
    rng: StdRng,
}

impl Channel {
    /// Create a reproducible channel
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a channel seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Pass `tx` through the channel.
    ///
    /// `dispersion` is the number of multipath taps, `snr_db` the noise
    /// level; either can be left out. The output has the length of `tx`.
    pub fn transmit(
        &mut self,
        tx: &[Complex],
        dispersion: Option<usize>,
        snr_db: Option<f64>,
        bits_per_symbol: u32,
    ) -> Result<Vec<Complex>> {
        let mut rx = match dispersion {
            Some(taps) if taps > 0 && !tx.is_empty() => self.disperse(tx, taps)?,
            _ => tx.to_vec(),
        };

        if let Some(snr) = snr_db {
            self.add_noise(&mut rx, snr, bits_per_symbol);
        }

        Ok(rx)
    }

    /// Draw a path gain and return the impulse response it defines
    pub fn draw_path_gains(&mut self, taps: usize) -> Result<Vec<Complex>> {
        let distribution =
            Normal::new(0.0, PATH_GAIN_STD).context("Invalid path gain distribution")?;
        let gain: f64 = distribution.sample(&mut self.rng);
        trace!(gain, taps, "drew path gain");

        Ok((0..taps)
            .map(|i| Complex::new(gain.powi(i as i32), 0.0))
            .collect())
    }

    fn disperse(&mut self, tx: &[Complex], taps: usize) -> Result<Vec<Complex>> {
        let path_gains = self.draw_path_gains(taps)?;
        convolve(tx, &path_gains)
    }

    fn add_noise(&mut self, samples: &mut [Complex], snr_db: f64, bits_per_symbol: u32) {
        let scale = 10.0_f64.powf(-snr_db / 20.0) / (2.0 * f64::from(bits_per_symbol.max(1))).sqrt();

        for sample in samples.iter_mut() {
            let re: f64 = StandardNormal.sample(&mut self.rng);
            let im: f64 = StandardNormal.sample(&mut self.rng);
            *sample += Complex::new(re, im) * scale;
        }
    }
}

/// Linear convolution of `signal` with `kernel`, truncated to the signal
/// length
pub fn convolve(signal: &[Complex], kernel: &[Complex]) -> Result<Vec<Complex>> {
    let size = signal.len() + kernel.len();
    let fft = FftProcessor::new(size).context("Invalid convolution length")?;

    let signal_spectrum = fft.fft_padded(signal)?;
    let kernel_spectrum = fft.fft_padded(kernel)?;
    let product: Vec<Complex> = signal_spectrum
        .iter()
        .zip(&kernel_spectrum)
        .map(|(&s, &k)| s * k)
        .collect();

    let mut output = fft.ifft_padded(&product)?;
    output.truncate(signal.len());
    Ok(output)
}
