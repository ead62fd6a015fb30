//! Pilot design matrices for least-squares channel estimation
//!
//! Each matrix maps `L` channel taps to the `N` cyclic-prefix-free receive
//! samples of a known pilot symbol. The pilot waveform is duplicated to
//! emulate circular continuation across the prefix boundary, time-reversed,
//! and expanded into an `L`-column convolution matrix; the middle `N` rows
//! (`N - 1 ..= 2N - 2`) form the design matrix.
//!
//! `dense` is built from the all-pilot symbol, `sparse` from the comb
//! pattern (every `F`-th subcarrier plus the last one).

use crate::{ModemError, Result};
use nalgebra::DMatrix;
use ofdmlink_core::fft::FftProcessor;
use ofdmlink_core::linalg::{convolution_matrix, LeastSquares};
use ofdmlink_core::{buffer, Complex};
use ofdmlink_frame::FrameConfig;
use tracing::debug;

/// Dense and sparse design matrices for one [`FrameConfig`]
#[derive(Debug, Clone)]
pub struct PilotDesignMatrices {
    config: FrameConfig,
    dense: DMatrix<Complex>,
    sparse: DMatrix<Complex>,
    dense_solver: LeastSquares,
    sparse_solver: LeastSquares,
}

impl PilotDesignMatrices {
    /// Derive both matrices (and their decompositions) from `config`
    pub fn new(config: &FrameConfig, fft: &FftProcessor) -> Result<Self> {
        let n = config.subcarriers();
        if fft.size() != n {
            return Err(ModemError::InvalidParameters {
                msg: format!("FFT size {} does not match {} subcarriers", fft.size(), n),
            });
        }

        let pilot = config.pilot_value();
        let dense_spectrum = vec![pilot; n];
        let mut sparse_spectrum = buffer::zeros(n);
        for j in config.comb_positions() {
            sparse_spectrum[j] = pilot;
        }

        let dense = Self::design_matrix(&dense_spectrum, config, fft)?;
        let sparse = Self::design_matrix(&sparse_spectrum, config, fft)?;

        let dense_solver = LeastSquares::new(dense.clone())?;
        let sparse_solver = LeastSquares::new(sparse.clone())?;

        debug!(
            rows = n,
            cols = config.cp_length(),
            dense_rank = dense_solver.rank(),
            sparse_rank = sparse_solver.rank(),
            "derived pilot design matrices"
        );

        Ok(Self {
            config: *config,
            dense,
            sparse,
            dense_solver,
            sparse_solver,
        })
    }

    fn design_matrix(
        spectrum: &[Complex],
        config: &FrameConfig,
        fft: &FftProcessor,
    ) -> Result<DMatrix<Complex>> {
        let n = config.subcarriers();

        let mut waveform = buffer::zeros(n);
        fft.ifft_unitary(spectrum, &mut waveform)?;

        let reversed: Vec<Complex> = waveform
            .iter()
            .chain(waveform.iter())
            .rev()
            .copied()
            .collect();

        let full = convolution_matrix(&reversed, config.cp_length());
        Ok(full.view((n - 1, 0), (n, config.cp_length())).into_owned())
    }

    /// Configuration these matrices were derived from
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// `N x L` matrix of the all-pilot symbol
    pub fn dense(&self) -> &DMatrix<Complex> {
        &self.dense
    }

    /// `N x L` matrix of the comb pilot pattern
    pub fn sparse(&self) -> &DMatrix<Complex> {
        &self.sparse
    }

    /// Minimum-norm least-squares solve of `dense * h = observed`
    pub fn solve_dense(&self, observed: &[Complex]) -> Result<Vec<Complex>> {
        Ok(self.dense_solver.solve(observed)?)
    }

    /// Minimum-norm least-squares solve of `sparse * h = observed`
    pub fn solve_sparse(&self, observed: &[Complex]) -> Result<Vec<Complex>> {
        Ok(self.sparse_solver.solve(observed)?)
    }
}
