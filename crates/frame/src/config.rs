//! Frame configuration shared by every stage of the transceiver

use crate::{FrameError, Result};
use ofdmlink_core::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

/// Default pilot constant, `(1 + j) / sqrt(2)`
pub const DEFAULT_PILOT: Complex = Complex::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2);

/// Allowed deviation of the pilot magnitude from one
const PILOT_MAGNITUDE_TOLERANCE: f64 = 1e-9;

/// Raw, unvalidated frame parameters as they appear in config files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameParams {
    /// Number of subcarriers (FFT size) `N`
    pub subcarriers: usize,
    /// Cyclic prefix length `L`
    pub cp_length: usize,
    /// OFDM symbols per pilot period `T`, the full-pilot symbol included
    pub pilot_time_spacing: usize,
    /// Subcarrier stride `F` of the comb pilots
    pub pilot_freq_spacing: usize,
    /// Pilot constant, serialized as `[re, im]`
    pub pilot_value: Complex,
}

impl Default for FrameParams {
    fn default() -> Self {
        let subcarriers = 1024;
        let cp_length = 16;
        Self {
            subcarriers,
            cp_length,
            pilot_time_spacing: 32,
            pilot_freq_spacing: subcarriers / (4 * cp_length),
            pilot_value: DEFAULT_PILOT,
        }
    }
}

/// Validated, immutable frame configuration `(N, L, T, F, pilot)`
///
/// Everything derived from a configuration (pilot grid, design matrices)
/// is only valid for this exact tuple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameParams", into = "FrameParams")]
pub struct FrameConfig {
    subcarriers: usize,
    cp_length: usize,
    pilot_time_spacing: usize,
    pilot_freq_spacing: usize,
    pilot_value: Complex,
}

impl FrameConfig {
    /// Create and validate a frame configuration
    pub fn new(
        subcarriers: usize,
        cp_length: usize,
        pilot_time_spacing: usize,
        pilot_freq_spacing: usize,
        pilot_value: Complex,
    ) -> Result<Self> {
        if subcarriers == 0 {
            return Err(FrameError::InvalidConfig {
                msg: "subcarrier count must be greater than 0".to_string(),
            });
        }

        if cp_length == 0 || cp_length >= subcarriers {
            return Err(FrameError::InvalidConfig {
                msg: format!(
                    "cyclic prefix length must satisfy 0 < L < N, got L={} N={}",
                    cp_length, subcarriers
                ),
            });
        }

        if pilot_time_spacing == 0 {
            return Err(FrameError::InvalidConfig {
                msg: "pilot time spacing must be at least 1".to_string(),
            });
        }

        if pilot_freq_spacing == 0 {
            return Err(FrameError::InvalidConfig {
                msg: "pilot frequency spacing must be at least 1".to_string(),
            });
        }

        if !pilot_value.re.is_finite()
            || !pilot_value.im.is_finite()
            || (pilot_value.norm() - 1.0).abs() > PILOT_MAGNITUDE_TOLERANCE
        {
            return Err(FrameError::InvalidConfig {
                msg: format!("pilot value must have unit magnitude, got {}", pilot_value),
            });
        }

        Ok(Self {
            subcarriers,
            cp_length,
            pilot_time_spacing,
            pilot_freq_spacing,
            pilot_value,
        })
    }

    /// Number of subcarriers `N`
    pub fn subcarriers(&self) -> usize {
        self.subcarriers
    }

    /// Cyclic prefix length `L`
    pub fn cp_length(&self) -> usize {
        self.cp_length
    }

    /// Pilot period `T` in OFDM symbols
    pub fn pilot_time_spacing(&self) -> usize {
        self.pilot_time_spacing
    }

    /// Comb pilot stride `F` in subcarriers
    pub fn pilot_freq_spacing(&self) -> usize {
        self.pilot_freq_spacing
    }

    /// Pilot constant
    pub fn pilot_value(&self) -> Complex {
        self.pilot_value
    }

    /// Time-domain samples per OFDM symbol, prefix included
    pub fn symbol_length(&self) -> usize {
        self.subcarriers + self.cp_length
    }

    /// Whether subcarrier `index` carries a comb pilot in a data symbol
    pub fn is_comb_pilot(&self, index: usize) -> bool {
        index % self.pilot_freq_spacing == 0 || index == self.subcarriers - 1
    }

    /// Comb pilot subcarriers in ascending order
    pub fn comb_positions(&self) -> Vec<usize> {
        (0..self.subcarriers).filter(|&j| self.is_comb_pilot(j)).collect()
    }

    /// Data slots in one data-bearing OFDM symbol
    pub fn data_slots_per_symbol(&self) -> usize {
        self.subcarriers - self.comb_positions().len()
    }

    /// Data slots in one pilot period of `T` symbols
    pub fn data_capacity_per_period(&self) -> usize {
        (self.pilot_time_spacing - 1) * self.data_slots_per_symbol()
    }
}

impl TryFrom<FrameParams> for FrameConfig {
    type Error = FrameError;

    fn try_from(params: FrameParams) -> Result<Self> {
        Self::new(
            params.subcarriers,
            params.cp_length,
            params.pilot_time_spacing,
            params.pilot_freq_spacing,
            params.pilot_value,
        )
    }
}

impl From<FrameConfig> for FrameParams {
    fn from(config: FrameConfig) -> Self {
        Self {
            subcarriers: config.subcarriers,
            cp_length: config.cp_length,
            pilot_time_spacing: config.pilot_time_spacing,
            pilot_freq_spacing: config.pilot_freq_spacing,
            pilot_value: config.pilot_value,
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        let params = FrameParams::default();
        Self {
            subcarriers: params.subcarriers,
            cp_length: params.cp_length,
            pilot_time_spacing: params.pilot_time_spacing,
            pilot_freq_spacing: params.pilot_freq_spacing,
            pilot_value: params.pilot_value,
        }
    }
}
