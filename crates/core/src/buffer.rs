//! Complex sample type and block-wise buffer helpers

use crate::{CoreError, Result};

/// Complex number representation for IQ data and subcarrier values
///
/// This is the `num-complex` type used by both `rustfft` and `nalgebra`,
/// so buffers move between the FFT and the least-squares solver without
/// conversion.
pub type Complex = num_complex::Complex64;

/// Buffer of `len` zero samples
pub fn zeros(len: usize) -> Vec<Complex> {
    vec![Complex::new(0.0, 0.0); len]
}

/// Buffer of `len` samples equal to one
pub fn ones(len: usize) -> Vec<Complex> {
    vec![Complex::new(1.0, 0.0); len]
}

/// Number of whole `block`-sample blocks in `len` samples.
///
/// Fails when `len` is not a whole number of blocks; a trailing partial
/// block is never silently dropped.
pub fn block_count(len: usize, block: usize) -> Result<usize> {
    if block == 0 || len % block != 0 {
        return Err(CoreError::BlockMisaligned { block, actual: len });
    }

    Ok(len / block)
}

/// Split `samples` into consecutive blocks of exactly `block` samples
pub fn blocks(samples: &[Complex], block: usize) -> Result<std::slice::ChunksExact<'_, Complex>> {
    block_count(samples.len(), block)?;
    Ok(samples.chunks_exact(block))
}

/// Largest elementwise distance between two equally long buffers
pub fn max_abs_diff(a: &[Complex], b: &[Complex]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(CoreError::BufferSizeMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a.iter()
        .zip(b)
        .map(|(&x, &y)| (x - y).norm())
        .fold(0.0, f64::max))
}
