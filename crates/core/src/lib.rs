//! ofdmlink Core - DSP primitives shared by the OFDM transceiver
//!
//! This crate provides the complex sample type, block-wise sample
//! helpers, an FFT wrapper with the unitary OFDM scaling conventions,
//! and the linear algebra used for least-squares channel estimation.

pub mod buffer;
pub mod fft;
pub mod linalg;
pub mod error;

pub use buffer::Complex;
pub use error::{CoreError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        buffer::{self, Complex},
        fft::FftProcessor,
        linalg::{convolution_matrix, LeastSquares},
        error::{CoreError, Result},
    };
}
