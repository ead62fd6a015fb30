//! Square 16-QAM with unit average energy

use crate::constellation::ConstellationCodec;
use crate::{CodecError, Result};
use ofdmlink_core::Complex;

/// Raw 16-QAM grid, normalized by `sqrt(10)` at construction
const QAM16_GRID: [(f64, f64); 16] = [
    (-3.0, 3.0),
    (-3.0, 1.0),
    (-3.0, -3.0),
    (-3.0, -1.0),
    (-1.0, 3.0),
    (-1.0, 1.0),
    (-1.0, -3.0),
    (-1.0, -1.0),
    (3.0, 3.0),
    (3.0, 1.0),
    (3.0, -3.0),
    (3.0, -1.0),
    (1.0, 3.0),
    (1.0, 1.0),
    (1.0, -3.0),
    (1.0, -1.0),
];

/// 16-QAM mapper, nearest-point demapper
#[derive(Debug, Clone)]
pub struct Qam16 {
    points: [Complex; 16],
}

impl Qam16 {
    pub fn new() -> Self {
        let scale = 10.0_f64.sqrt().recip();
        Self {
            points: QAM16_GRID.map(|(re, im)| Complex::new(re * scale, im * scale)),
        }
    }

    pub fn points(&self) -> &[Complex] {
        &self.points
    }

    fn nearest(&self, sample: Complex) -> usize {
        // strict comparison keeps the lowest index on ties
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (index, &point) in self.points.iter().enumerate() {
            let distance = (sample - point).norm_sqr();
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        best
    }
}

impl Default for Qam16 {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstellationCodec for Qam16 {
    fn encode(&self, symbols: &[usize]) -> Result<Vec<Complex>> {
        symbols
            .iter()
            .map(|&index| {
                self.points
                    .get(index)
                    .copied()
                    .ok_or(CodecError::SymbolOutOfRange {
                        index,
                        alphabet: self.points.len(),
                    })
            })
            .collect()
    }

    fn decode(&self, samples: &[Complex]) -> Vec<usize> {
        samples.iter().map(|&sample| self.nearest(sample)).collect()
    }

    fn symbol_count(&self) -> usize {
        self.points.len()
    }
}
