//! Monte-Carlo bit-error-rate sweep over SNR and equalizer scenarios

use crate::channel::Channel;
use anyhow::{Context, Result};
use clap::ValueEnum;
use ofdmlink_codecs::prelude::*;
use ofdmlink_frame::FrameConfig;
use ofdmlink_modem::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use tracing::{debug, info};

/// Channel and equalizer combination of one BER curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Noise only, no equalization
    Ideal,
    /// Multipath and noise, no equalization
    NoEqualizer,
    /// Multipath and noise, pilot-ratio equalizer
    Naive,
    /// Multipath and noise, least-squares equalizer
    Lmmse,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Ideal,
        Scenario::NoEqualizer,
        Scenario::Naive,
        Scenario::Lmmse,
    ];

    pub fn equalizer(&self) -> EqualizerMode {
        match self {
            Scenario::Ideal | Scenario::NoEqualizer => EqualizerMode::None,
            Scenario::Naive => EqualizerMode::Naive,
            Scenario::Lmmse => EqualizerMode::Lmmse,
        }
    }

    pub fn dispersive(&self) -> bool {
        !matches!(self, Scenario::Ideal)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Ideal => "Ideal",
            Scenario::NoEqualizer => "No equalizer",
            Scenario::Naive => "Naive equalizer",
            Scenario::Lmmse => "LMMSE equalizer",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Transceiver and constellation shared by every trial of a sweep
pub struct Simulation {
    transceiver: OfdmTransceiver,
    codec: Box<dyn ConstellationCodec>,
}

impl Simulation {
    pub fn new(frame: FrameConfig, constellation: ConstellationKind) -> Result<Self> {
        let transceiver = OfdmTransceiver::new(frame).context("Failed to build transceiver")?;
        Ok(Self {
            transceiver,
            codec: constellation.codec(),
        })
    }

    pub fn transceiver(&self) -> &OfdmTransceiver {
        &self.transceiver
    }

    /// Send `symbols` random symbols through one channel realization and
    /// return the bit error rate.
    ///
    /// Dispersive scenarios use as many multipath taps as the cyclic prefix
    /// is long.
    pub fn simulate_transmission(
        &self,
        seed: u64,
        snr_db: Option<f64>,
        symbols: usize,
        scenario: Scenario,
    ) -> Result<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let alphabet = self.codec.symbol_count();
        let tx_data: Vec<usize> = (0..symbols).map(|_| rng.gen_range(0..alphabet)).collect();

        let tx_points = self.codec.encode(&tx_data)?;
        let tx_signal = self.transceiver.encode(&tx_points)?;

        let dispersion = scenario
            .dispersive()
            .then(|| self.transceiver.config().cp_length());
        let mut channel = Channel::new(rng.gen());
        let rx_signal =
            channel.transmit(&tx_signal, dispersion, snr_db, self.codec.bits_per_symbol())?;

        let rx_points = self
            .transceiver
            .decode(&rx_signal, scenario.equalizer(), Some(symbols))?;
        let rx_data = self.codec.decode(&rx_points);

        let errors = bit_errors(&tx_data, &rx_data)?;
        let bits = symbols * self.codec.bits_per_symbol() as usize;
        Ok(if bits == 0 {
            0.0
        } else {
            errors as f64 / bits as f64
        })
    }
}

/// Parameters of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParams {
    pub snr_db: Vec<f64>,
    pub runs: usize,
    pub symbols: usize,
    pub seed: u64,
    pub scenarios: Vec<Scenario>,
}

/// Mean BER of one scenario at every SNR point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BerCurve {
    pub scenario: Scenario,
    pub ber: Vec<f64>,
}

/// Result of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BerReport {
    pub snr_db: Vec<f64>,
    pub runs: usize,
    pub symbols: usize,
    pub curves: Vec<BerCurve>,
}

impl BerReport {
    pub fn curve(&self, scenario: Scenario) -> Option<&BerCurve> {
        self.curves.iter().find(|curve| curve.scenario == scenario)
    }

    /// Plain-text table, one row per SNR point
    pub fn to_table(&self) -> String {
        let mut table = String::new();
        let _ = write!(table, "{:>8}", "SNR dB");
        for curve in &self.curves {
            let _ = write!(table, " {:>16}", curve.scenario.label());
        }
        table.push('\n');

        for (row, snr) in self.snr_db.iter().enumerate() {
            let _ = write!(table, "{:>8.1}", snr);
            for curve in &self.curves {
                let _ = write!(table, " {:>16.3e}", curve.ber[row]);
            }
            table.push('\n');
        }
        table
    }
}

/// Average BER over `runs` trials for every scenario and SNR point.
///
/// Trials run on the rayon pool. Trial `k` of the sweep (numbered across
/// scenarios, SNR points and runs) is seeded with `seed + k`, so a report
/// only depends on its parameters.
pub fn run_sweep(simulation: &Simulation, params: &SweepParams) -> Result<BerReport> {
    let points = params.snr_db.len();
    let mut curves = Vec::with_capacity(params.scenarios.len());

    for (scenario_index, &scenario) in params.scenarios.iter().enumerate() {
        let mut ber = Vec::with_capacity(points);
        for (snr_index, &snr) in params.snr_db.iter().enumerate() {
            let first_trial = ((scenario_index * points + snr_index) * params.runs) as u64;

            let rates = (0..params.runs)
                .into_par_iter()
                .map(|run| {
                    let seed = params.seed.wrapping_add(first_trial + run as u64);
                    simulation.simulate_transmission(seed, Some(snr), params.symbols, scenario)
                })
                .collect::<Result<Vec<f64>>>()?;

            let mean = if rates.is_empty() {
                0.0
            } else {
                rates.iter().sum::<f64>() / rates.len() as f64
            };
            debug!(%scenario, snr, ber = mean, "finished SNR point");
            ber.push(mean);
        }

        info!(%scenario, "finished scenario");
        curves.push(BerCurve { scenario, ber });
    }

    Ok(BerReport {
        snr_db: params.snr_db.clone(),
        runs: params.runs,
        symbols: params.symbols,
        curves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofdmlink_frame::DEFAULT_PILOT;

    fn simulation() -> Simulation {
        let frame = FrameConfig::new(64, 8, 4, 4, DEFAULT_PILOT).unwrap();
        Simulation::new(frame, ConstellationKind::Qam16).unwrap()
    }

    #[test]
    fn test_noiseless_ideal_transmission_is_error_free() {
        let ber = simulation()
            .simulate_transmission(5, None, 400, Scenario::Ideal)
            .unwrap();
        assert_eq!(ber, 0.0);
    }

    #[test]
    fn test_high_snr_ideal_transmission_is_error_free() {
        let ber = simulation()
            .simulate_transmission(9, Some(40.0), 400, Scenario::Ideal)
            .unwrap();
        assert_eq!(ber, 0.0);
    }

    #[test]
    fn test_trials_are_reproducible() {
        let sim = simulation();
        let a = sim.simulate_transmission(11, Some(4.0), 300, Scenario::Naive).unwrap();
        let b = sim.simulate_transmission(11, Some(4.0), 300, Scenario::Naive).unwrap();
        assert_eq!(a, b);
        assert!((0.0..=1.0).contains(&a));
    }

    #[test]
    fn test_scenario_mapping() {
        assert!(!Scenario::Ideal.dispersive());
        assert_eq!(Scenario::NoEqualizer.equalizer(), EqualizerMode::None);
        assert_eq!(Scenario::Lmmse.equalizer(), EqualizerMode::Lmmse);
        assert_eq!(
            serde_json::to_string(&Scenario::NoEqualizer).unwrap(),
            "\"no-equalizer\""
        );
    }

    #[test]
    fn test_sweep_shape_and_table() {
        let params = SweepParams {
            snr_db: vec![0.0, 20.0],
            runs: 3,
            symbols: 200,
            seed: 1,
            scenarios: vec![Scenario::Ideal, Scenario::Naive],
        };
        let report = run_sweep(&simulation(), &params).unwrap();

        assert_eq!(report.curves.len(), 2);
        assert!(report.curves.iter().all(|curve| curve.ber.len() == 2));
        assert!(report.curve(Scenario::Lmmse).is_none());

        let table = report.to_table();
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("Naive equalizer"));
    }
}
