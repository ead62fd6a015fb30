//! Constellation codec interface

use crate::qam::Qam16;
use crate::{CodecError, Result};
use ofdmlink_core::Complex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maps symbol indices onto complex points and back
pub trait ConstellationCodec: Send + Sync {
    /// Map each index to its constellation point
    fn encode(&self, symbols: &[usize]) -> Result<Vec<Complex>>;

    /// Hard decision: the index of the nearest point for every sample
    fn decode(&self, samples: &[Complex]) -> Vec<usize>;

    /// Alphabet size
    fn symbol_count(&self) -> usize;

    /// Bits carried by one symbol
    fn bits_per_symbol(&self) -> u32 {
        self.symbol_count().trailing_zeros()
    }
}

/// Constellations selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstellationKind {
    Qam16,
}

impl ConstellationKind {
    pub fn codec(&self) -> Box<dyn ConstellationCodec> {
        match self {
            ConstellationKind::Qam16 => Box::new(Qam16::new()),
        }
    }
}

impl fmt::Display for ConstellationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstellationKind::Qam16 => f.write_str("qam16"),
        }
    }
}

impl FromStr for ConstellationKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "qam16" | "16qam" | "16-qam" => Ok(ConstellationKind::Qam16),
            _ => Err(CodecError::UnsupportedConstellation { name: s.to_string() }),
        }
    }
}

/// Count differing bits between two index streams of equal length
pub fn bit_errors(sent: &[usize], received: &[usize]) -> Result<usize> {
    if sent.len() != received.len() {
        return Err(CodecError::LengthMismatch {
            expected: sent.len(),
            actual: received.len(),
        });
    }

    Ok(sent
        .iter()
        .zip(received)
        .map(|(&a, &b)| (a ^ b).count_ones() as usize)
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_errors() {
        assert_eq!(bit_errors(&[0, 15, 5], &[0, 15, 5]).unwrap(), 0);
        assert_eq!(bit_errors(&[0, 15, 5], &[1, 0, 4]).unwrap(), 1 + 4 + 1);
    }

    #[test]
    fn test_bit_errors_length_mismatch() {
        assert!(matches!(
            bit_errors(&[0, 1], &[0]),
            Err(CodecError::LengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("QAM16".parse::<ConstellationKind>().unwrap(), ConstellationKind::Qam16);
        assert_eq!("16-qam".parse::<ConstellationKind>().unwrap(), ConstellationKind::Qam16);
        assert!("psk8".parse::<ConstellationKind>().is_err());

        let kind: ConstellationKind = serde_json::from_str("\"qam16\"").unwrap();
        assert_eq!(kind.codec().bits_per_symbol(), 4);
    }
}
