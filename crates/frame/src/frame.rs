//! Frame structure, builder and extractor

use crate::grid::{PilotGrid, SlotKind};
use crate::{FrameConfig, FrameError, Result};
use ofdmlink_core::{buffer, Complex};
use tracing::debug;

/// Subcarrier-domain frame: consecutive OFDM symbols of `N` values each
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    subcarriers: usize,
    values: Vec<Complex>,
}

impl Frame {
    /// Wrap flat subcarrier values, `N` per OFDM symbol
    pub fn from_values(values: Vec<Complex>, subcarriers: usize) -> Result<Self> {
        buffer::block_count(values.len(), subcarriers)?;
        Ok(Self { subcarriers, values })
    }

    /// Subcarriers per OFDM symbol
    pub fn subcarriers(&self) -> usize {
        self.subcarriers
    }

    /// Number of OFDM symbols
    pub fn symbol_count(&self) -> usize {
        self.values.len() / self.subcarriers
    }

    /// Subcarrier values of OFDM symbol `index`
    pub fn symbol(&self, index: usize) -> Option<&[Complex]> {
        let start = index.checked_mul(self.subcarriers)?;
        self.values.get(start..start + self.subcarriers)
    }

    /// Iterate over OFDM symbols
    pub fn symbols(&self) -> std::slice::ChunksExact<'_, Complex> {
        self.values.chunks_exact(self.subcarriers)
    }

    pub fn values(&self) -> &[Complex] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Complex> {
        self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Interleaves data symbols with the pilot grid
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    grid: PilotGrid,
}

impl FrameBuilder {
    /// Create a new frame builder
    pub fn new(config: FrameConfig) -> Self {
        Self {
            grid: PilotGrid::new(config),
        }
    }

    /// Build a frame carrying `data`.
    ///
    /// The frame holds `ceil(len / capacity)` whole pilot periods. Data
    /// slots left over after the stream runs out are filled with the
    /// pilot value.
    pub fn build(&self, data: &[Complex]) -> Result<Frame> {
        let config = self.grid.config();
        let pilot = config.pilot_value();
        let periods = self.grid.periods_for(data.len())?;
        let period_len = self.grid.period_len();

        let mut stream = data.iter().copied();
        let values: Vec<Complex> = (0..periods * period_len)
            .map(|position| match self.grid.slot(position % period_len) {
                SlotKind::Data => stream.next().unwrap_or(pilot),
                SlotKind::FullPilot | SlotKind::CombPilot => pilot,
            })
            .collect();

        debug!(
            data_symbols = data.len(),
            periods,
            ofdm_symbols = periods * config.pilot_time_spacing(),
            "built frame"
        );

        Frame::from_values(values, config.subcarriers())
    }
}

/// Removes the pilot grid from a (equalized) frame
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    grid: PilotGrid,
}

impl FrameExtractor {
    /// Create a new frame extractor
    pub fn new(config: FrameConfig) -> Self {
        Self {
            grid: PilotGrid::new(config),
        }
    }

    /// Return the data-slot values of `frame` in transmit order, truncated
    /// to `max_len` when given.
    pub fn extract(&self, frame: &Frame, max_len: Option<usize>) -> Result<Vec<Complex>> {
        let n = self.grid.config().subcarriers();
        if frame.subcarriers() != n {
            return Err(FrameError::SizeMismatch {
                expected: n,
                actual: frame.subcarriers(),
            });
        }

        let limit = max_len.unwrap_or(usize::MAX);
        let data: Vec<Complex> = frame
            .symbols()
            .enumerate()
            .filter(|&(index, _)| !self.grid.is_pilot_symbol(index))
            .flat_map(|(index, symbol)| {
                symbol
                    .iter()
                    .enumerate()
                    .filter(move |&(j, _)| self.grid.slot_at(index, j) == SlotKind::Data)
                    .map(|(_, &value)| value)
            })
            .take(limit)
            .collect();

        Ok(data)
    }
}
