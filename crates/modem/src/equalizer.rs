//! Pilot-aided channel estimation and zero-forcing equalization
//!
//! The first OFDM symbol of a frame is pilot on every subcarrier and
//! initializes the per-subcarrier gain. Every later full-pilot symbol
//! (index a multiple of `T`) re-estimates it from the comb subcarriers only
//! (`j % F == 0` and the last subcarrier):
//!
//! - `None` keeps unit gain.
//! - `Naive` replaces the gain with the comb ratios, linearly interpolated.
//! - `Lmmse` solves the comb observations against the sparse design matrix
//!   and blends the result into the tracked gain,
//!   `gain = 0.7 * gain + 0.3 * candidate`.
//!
//! Re-estimation reads only the comb subset and solves against the sparse
//! matrix, even on symbols that carry pilots everywhere. The initial
//! estimate uses the dense matrix.

use crate::design::PilotDesignMatrices;
use crate::{ModemError, Result};
use ofdmlink_core::fft::FftProcessor;
use ofdmlink_core::{buffer, Complex};
use ofdmlink_frame::FrameConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Weight of the previously tracked gain in the `Lmmse` update
pub const TRACKING_MEMORY: f64 = 0.7;

/// Weight of the new candidate estimate in the `Lmmse` update
pub const TRACKING_INNOVATION: f64 = 0.3;

/// Channel estimation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EqualizerMode {
    /// Unit gain, no distortion correction
    #[serde(rename = "None", alias = "none")]
    None,
    /// Per-subcarrier ratio of observed to transmitted pilot
    #[serde(rename = "Naive", alias = "naive")]
    Naive,
    /// Least-squares impulse-response fit through the design matrices
    #[serde(rename = "LMMSE", alias = "lmmse", alias = "Lmmse")]
    Lmmse,
}

impl EqualizerMode {
    /// All modes, in increasing order of effort
    pub const ALL: [EqualizerMode; 3] = [EqualizerMode::None, EqualizerMode::Naive, EqualizerMode::Lmmse];

    pub fn name(&self) -> &'static str {
        match self {
            EqualizerMode::None => "None",
            EqualizerMode::Naive => "Naive",
            EqualizerMode::Lmmse => "LMMSE",
        }
    }
}

impl fmt::Display for EqualizerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EqualizerMode {
    type Err = ModemError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(EqualizerMode::None),
            "naive" => Ok(EqualizerMode::Naive),
            "lmmse" => Ok(EqualizerMode::Lmmse),
            _ => Err(ModemError::UnsupportedEqualizer { name: s.to_string() }),
        }
    }
}

/// Gain estimator for one frame configuration
///
/// Holds only read-only state, so a single estimator serves any number of
/// concurrent decodes.
#[derive(Debug, Clone)]
pub struct ChannelEstimator {
    config: FrameConfig,
    design: PilotDesignMatrices,
    fft_processor: FftProcessor,
    comb: Vec<usize>,
}

impl ChannelEstimator {
    /// Create an estimator, deriving the design matrices for `config`
    pub fn new(config: FrameConfig, fft_processor: FftProcessor) -> Result<Self> {
        let design = PilotDesignMatrices::new(&config, &fft_processor)?;
        Ok(Self {
            comb: config.comb_positions(),
            config,
            design,
            fft_processor,
        })
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn design(&self) -> &PilotDesignMatrices {
        &self.design
    }

    /// Gain estimate from the first, all-pilot OFDM symbol.
    ///
    /// `time_domain` is the prefix-free receive block, `subcarriers` its
    /// forward transform.
    pub fn initial_estimate(
        &self,
        mode: EqualizerMode,
        time_domain: &[Complex],
        subcarriers: &[Complex],
    ) -> Result<Vec<Complex>> {
        self.check_len(time_domain)?;
        self.check_len(subcarriers)?;

        match mode {
            EqualizerMode::None => Ok(buffer::ones(self.config.subcarriers())),
            EqualizerMode::Naive => {
                let pilot = self.config.pilot_value();
                Ok(subcarriers.iter().map(|&y| y / pilot).collect())
            }
            EqualizerMode::Lmmse => {
                let taps = self.design.solve_dense(time_domain)?;
                Ok(self.fft_processor.fft_padded(&taps)?)
            }
        }
    }

    /// Candidate gain from the comb subcarriers of a later pilot symbol
    pub fn comb_estimate(&self, mode: EqualizerMode, subcarriers: &[Complex]) -> Result<Vec<Complex>> {
        self.check_len(subcarriers)?;

        match mode {
            EqualizerMode::None => Ok(buffer::ones(self.config.subcarriers())),
            EqualizerMode::Naive => Ok(self.interpolate_comb(subcarriers)),
            EqualizerMode::Lmmse => {
                let mut received_pilots = buffer::zeros(self.config.subcarriers());
                for &j in &self.comb {
                    received_pilots[j] = subcarriers[j];
                }

                let mut constructed = buffer::zeros(self.config.subcarriers());
                self.fft_processor
                    .fft_unitary(&received_pilots, &mut constructed)?;

                let taps = self.design.solve_sparse(&constructed)?;
                Ok(self.fft_processor.ifft_padded(&taps)?)
            }
        }
    }

    /// Comb ratios with linear interpolation in between
    fn interpolate_comb(&self, subcarriers: &[Complex]) -> Vec<Complex> {
        let pilot = self.config.pilot_value();
        let mut gain = buffer::zeros(self.config.subcarriers());

        // comb always holds 0 and N - 1, and N >= 2
        for pair in self.comb.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let g_lo = subcarriers[lo] / pilot;
            let g_hi = subcarriers[hi] / pilot;
            let span = (hi - lo) as f64;
            for (k, slot) in gain.iter_mut().enumerate().take(hi + 1).skip(lo) {
                let t = (k - lo) as f64 / span;
                *slot = g_lo * (1.0 - t) + g_hi * t;
            }
        }

        gain
    }

    fn check_len(&self, values: &[Complex]) -> Result<()> {
        let n = self.config.subcarriers();
        if values.len() != n {
            return Err(ModemError::DimensionMismatch {
                block: n,
                actual: values.len(),
            });
        }
        Ok(())
    }
}

/// Per-decode equalizer gain, created from the first pilot symbol
///
/// Each decode owns its state; it is never shared between calls.
#[derive(Debug, Clone)]
pub struct EqualizerState {
    mode: EqualizerMode,
    gain: Vec<Complex>,
    pilot_updates: usize,
}

impl EqualizerState {
    /// Initialize tracking from the first (all-pilot) OFDM symbol
    pub fn initialize(
        estimator: &ChannelEstimator,
        mode: EqualizerMode,
        time_domain: &[Complex],
        subcarriers: &[Complex],
    ) -> Result<Self> {
        let gain = estimator.initial_estimate(mode, time_domain, subcarriers)?;
        Ok(Self {
            mode,
            gain,
            pilot_updates: 0,
        })
    }

    /// Update the gain from a later full-pilot symbol
    pub fn track(&mut self, estimator: &ChannelEstimator, subcarriers: &[Complex]) -> Result<()> {
        let candidate = estimator.comb_estimate(self.mode, subcarriers)?;

        match self.mode {
            EqualizerMode::Lmmse => {
                for (gain, new) in self.gain.iter_mut().zip(&candidate) {
                    *gain = *gain * TRACKING_MEMORY + *new * TRACKING_INNOVATION;
                }
            }
            EqualizerMode::None | EqualizerMode::Naive => self.gain = candidate,
        }

        self.pilot_updates += 1;
        trace!(mode = %self.mode, updates = self.pilot_updates, "tracked pilot symbol");
        Ok(())
    }

    /// Divide observed subcarrier values by the current gain
    pub fn equalize(&self, observed: &[Complex]) -> Vec<Complex> {
        observed.iter().zip(&self.gain).map(|(&y, &g)| y / g).collect()
    }

    pub fn mode(&self) -> EqualizerMode {
        self.mode
    }

    /// Current per-subcarrier gain
    pub fn gain(&self) -> &[Complex] {
        &self.gain
    }

    /// Number of pilot symbols tracked after initialization
    pub fn pilot_updates(&self) -> usize {
        self.pilot_updates
    }
}
