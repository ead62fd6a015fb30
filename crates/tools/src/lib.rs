//! ofdmlink Tools library
//!
//! Channel model, Monte-Carlo bit-error-rate sweep and the configuration
//! behind the `ofdmlink-sim` binary.

pub mod channel;
pub mod config;
pub mod sweep;

pub use channel::Channel;
pub use config::SimConfig;
pub use sweep::{run_sweep, BerCurve, BerReport, Scenario, Simulation, SweepParams};
