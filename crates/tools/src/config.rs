//! Configuration management for the simulation tools

use crate::sweep::{Scenario, SweepParams};
use anyhow::{Context, Result};
use ofdmlink_codecs::prelude::ConstellationKind;
use ofdmlink_frame::FrameConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full BER simulation configuration
///
/// Missing keys in a config file fall back to [`SimConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// SNR points in dB
    pub snr_db: Vec<f64>,
    /// Trials averaged per SNR point
    pub runs: usize,
    /// Data symbols per trial
    pub symbols: usize,
    /// Base seed; trial `k` uses `seed + k`
    pub seed: u64,
    pub scenarios: Vec<Scenario>,
    pub constellation: ConstellationKind,
    /// Frame layout, validated on load
    pub frame: FrameConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            snr_db: (0..12).step_by(2).map(f64::from).collect(),
            runs: 100,
            symbols: 16384,
            seed: 0,
            scenarios: Scenario::ALL.to_vec(),
            constellation: ConstellationKind::Qam16,
            frame: FrameConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn sweep_params(&self) -> SweepParams {
        SweepParams {
            snr_db: self.snr_db.clone(),
            runs: self.runs,
            symbols: self.symbols,
            seed: self.seed,
            scenarios: self.scenarios.clone(),
        }
    }
}
