//! Periodic time/frequency pilot grid
//!
//! A frame is a sequence of pilot periods of `T` OFDM symbols each. The
//! first symbol of a period is pilot on every subcarrier. The remaining
//! `T - 1` symbols carry data, except on the comb subcarriers
//! (`j % F == 0` and the last subcarrier) which carry the pilot.
//!
//! Both framing directions go through [`PilotGrid::slot`], a pure
//! position-to-kind mapping, so builder and extractor cannot disagree.

use crate::{FrameConfig, FrameError, Result};

/// What a subcarrier slot carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Slot inside a full-pilot OFDM symbol
    FullPilot,
    /// Comb pilot inside a data-bearing OFDM symbol
    CombPilot,
    /// Data-bearing slot
    Data,
}

impl SlotKind {
    /// Whether the slot carries the pilot constant
    pub fn is_pilot(self) -> bool {
        !matches!(self, SlotKind::Data)
    }
}

/// Index mapping between frame positions and slot kinds
#[derive(Debug, Clone, Copy)]
pub struct PilotGrid {
    config: FrameConfig,
}

impl PilotGrid {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Subcarrier slots in one pilot period
    pub fn period_len(&self) -> usize {
        self.config.pilot_time_spacing() * self.config.subcarriers()
    }

    /// Whether OFDM symbol `symbol` (0-indexed within the frame) is a
    /// full-pilot symbol
    pub fn is_pilot_symbol(&self, symbol: usize) -> bool {
        symbol % self.config.pilot_time_spacing() == 0
    }

    /// Kind of the slot at subcarrier `subcarrier` of OFDM symbol `symbol`
    pub fn slot_at(&self, symbol: usize, subcarrier: usize) -> SlotKind {
        if self.is_pilot_symbol(symbol) {
            SlotKind::FullPilot
        } else if self.config.is_comb_pilot(subcarrier) {
            SlotKind::CombPilot
        } else {
            SlotKind::Data
        }
    }

    /// Kind of the slot at flat frame position `position`
    pub fn slot(&self, position: usize) -> SlotKind {
        let n = self.config.subcarriers();
        self.slot_at(position / n, position % n)
    }

    /// Number of pilot periods needed to carry `data_len` data symbols
    pub fn periods_for(&self, data_len: usize) -> Result<usize> {
        if data_len == 0 {
            return Ok(0);
        }

        let capacity = self.config.data_capacity_per_period();
        if capacity == 0 {
            return Err(FrameError::InvalidConfig {
                msg: format!(
                    "pilot grid leaves no data slots (T={}, F={}, N={})",
                    self.config.pilot_time_spacing(),
                    self.config.pilot_freq_spacing(),
                    self.config.subcarriers()
                ),
            });
        }

        Ok(data_len.div_ceil(capacity))
    }
}
