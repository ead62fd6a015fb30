//! FFT processing wrapper
//!
//! Unnormalized forward transform, `1/N` normalized inverse, and the
//! unitary pair used for OFDM symbols (`ifft(x) * sqrt(N)` on transmit,
//! `fft(y) / sqrt(N)` on receive).

use crate::{buffer::Complex, CoreError, Result};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// FFT processor for a fixed transform length
///
/// Plans are immutable once created, so one processor can be shared
/// between threads and cloned cheaply.
#[derive(Clone)]
pub struct FftProcessor {
    size: usize,
    fft: Arc<dyn Fft<f64>>,
    ifft: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for FftProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftProcessor").field("size", &self.size).finish()
    }
}

impl FftProcessor {
    /// Create a new FFT processor
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(CoreError::FftError {
                msg: "FFT size must be greater than 0".to_string(),
            });
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Ok(Self { size, fft, ifft })
    }

    /// Transform length
    pub fn size(&self) -> usize {
        self.size
    }

    /// Perform forward FFT (no scaling)
    pub fn fft(&self, input: &[Complex], output: &mut [Complex]) -> Result<()> {
        self.transform(&self.fft, input, output, 1.0)
    }

    /// Perform inverse FFT, normalized by `1/N`
    pub fn ifft(&self, input: &[Complex], output: &mut [Complex]) -> Result<()> {
        self.transform(&self.ifft, input, output, 1.0 / self.size as f64)
    }

    /// Forward FFT scaled by `1/sqrt(N)`
    pub fn fft_unitary(&self, input: &[Complex], output: &mut [Complex]) -> Result<()> {
        self.transform(&self.fft, input, output, 1.0 / (self.size as f64).sqrt())
    }

    /// Inverse FFT scaled so that `ifft(x) * sqrt(N)` is returned
    pub fn ifft_unitary(&self, input: &[Complex], output: &mut [Complex]) -> Result<()> {
        self.transform(&self.ifft, input, output, 1.0 / (self.size as f64).sqrt())
    }

    /// Forward FFT of `input` zero-padded to the transform length
    pub fn fft_padded(&self, input: &[Complex]) -> Result<Vec<Complex>> {
        let mut buffer = self.pad(input)?;
        self.fft.process(&mut buffer);
        Ok(buffer)
    }

    /// Normalized inverse FFT of `input` zero-padded to the transform length
    pub fn ifft_padded(&self, input: &[Complex]) -> Result<Vec<Complex>> {
        let mut buffer = self.pad(input)?;
        self.ifft.process(&mut buffer);
        let scale = 1.0 / self.size as f64;
        buffer.iter_mut().for_each(|c| *c *= scale);
        Ok(buffer)
    }

    fn pad(&self, input: &[Complex]) -> Result<Vec<Complex>> {
        if input.len() > self.size {
            return Err(CoreError::BufferSizeMismatch {
                expected: self.size,
                actual: input.len(),
            });
        }

        let mut buffer = crate::buffer::zeros(self.size);
        buffer[..input.len()].copy_from_slice(input);
        Ok(buffer)
    }

    fn transform(
        &self,
        plan: &Arc<dyn Fft<f64>>,
        input: &[Complex],
        output: &mut [Complex],
        scale: f64,
    ) -> Result<()> {
        if input.len() != self.size || output.len() != self.size {
            return Err(CoreError::BufferSizeMismatch {
                expected: self.size,
                actual: if input.len() != self.size { input.len() } else { output.len() },
            });
        }

        output.copy_from_slice(input);
        plan.process(output);

        if scale != 1.0 {
            output.iter_mut().for_each(|c| *c *= scale);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{max_abs_diff, zeros};
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_fft_processor_creation() {
        let processor = FftProcessor::new(64).unwrap();
        assert_eq!(processor.size(), 64);
    }

    #[test]
    fn test_fft_processor_invalid_size() {
        assert!(FftProcessor::new(0).is_err());
    }

    #[test]
    fn test_fft_size_mismatch() {
        let processor = FftProcessor::new(8).unwrap();
        let input = zeros(4);
        let mut output = zeros(8);
        let result = processor.fft(&input, &mut output);
        assert!(matches!(
            result,
            Err(CoreError::BufferSizeMismatch { expected: 8, actual: 4 })
        ));
    }

    #[test]
    fn test_fft_roundtrip() {
        let processor = FftProcessor::new(8).unwrap();

        let mut input = zeros(8);
        input[0] = Complex::new(1.0, 0.0);
        input[3] = Complex::new(-0.5, 2.0);

        let mut fft_output = zeros(8);
        let mut ifft_output = zeros(8);

        processor.fft(&input, &mut fft_output).unwrap();
        processor.ifft(&fft_output, &mut ifft_output).unwrap();

        assert!(max_abs_diff(&input, &ifft_output).unwrap() < 1e-12);
    }

    #[test]
    fn test_constant_spectrum_is_scaled_impulse() {
        // ifft(p * ones) * sqrt(N) == p * sqrt(N) * delta
        let n = 16;
        let processor = FftProcessor::new(n).unwrap();
        let pilot = Complex::new(0.6, 0.8);
        let mut waveform = zeros(n);
        processor.ifft_unitary(&vec![pilot; n], &mut waveform).unwrap();

        assert!((waveform[0] - pilot * (n as f64).sqrt()).norm() < 1e-12);
        for sample in &waveform[1..] {
            assert!(sample.norm() < 1e-12);
        }
    }

    #[test]
    fn test_padded_transforms() {
        let processor = FftProcessor::new(8).unwrap();
        let taps = vec![Complex::new(1.0, 0.0), Complex::new(0.5, 0.0)];

        let response = processor.fft_padded(&taps).unwrap();
        assert_eq!(response.len(), 8);
        // DC bin is the sum of taps
        assert!((response[0] - Complex::new(1.5, 0.0)).norm() < 1e-12);

        let back = processor.ifft_padded(&response).unwrap();
        assert!((back[0] - taps[0]).norm() < 1e-12);
        assert!((back[1] - taps[1]).norm() < 1e-12);
        assert!(back[2..].iter().all(|c| c.norm() < 1e-12));

        assert!(processor.fft_padded(&zeros(9)).is_err());
    }

    #[quickcheck]
    fn prop_unitary_pair_roundtrip(values: Vec<(i16, i16)>) -> bool {
        if values.is_empty() {
            return true;
        }
        let input: Vec<Complex> = values
            .iter()
            .map(|&(re, im)| Complex::new(re as f64 / 100.0, im as f64 / 100.0))
            .collect();
        let processor = FftProcessor::new(input.len()).unwrap();

        let mut time = zeros(input.len());
        let mut freq = zeros(input.len());
        processor.ifft_unitary(&input, &mut time).unwrap();
        processor.fft_unitary(&time, &mut freq).unwrap();

        max_abs_diff(&input, &freq).unwrap() < 1e-9
    }
}
