//! Per-bank memory power estimation.
//!
//! Bank power is `(reads * E_read + writes * E_write) / interval + leakage`, where:
//! 1. **Burst Counts:** `perBankRdBursts` / `perBankWrBursts` statistics, assigned to
//!    banks in the order they appear in the dump.
//! 2. **Energies:** CACTI's per-access read and write energies (columns 8 and 9 of its
//!    second output line) scaled by the DRAM burst length, and the per-bank leakage
//!    (column 10).
//! 3. **Interval:** `simSeconds` in nanoseconds.
//!
//! Results are rounded to three decimals, exact ties going to the even digit.

use crate::common::{BridgeError, LookupError, format_float};
use crate::config::ConfigStore;
use crate::stats::StatsStore;

/// DRAM parameters of the first memory controller.
const DRAM: &str = "system.mem_ctrls.0.dram";

const READ_BURSTS: &str = "perBankRdBursts";
const WRITE_BURSTS: &str = "perBankWrBursts";
const SIM_SECONDS: &str = "simSeconds";

const NS_PER_S: f64 = 1.0e9;

/// Zero-based CACTI output columns.
const CACTI_READ_COL: usize = 8;
const CACTI_WRITE_COL: usize = 9;
const CACTI_LEAKAGE_COL: usize = 10;

/// Energies read from a CACTI output file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryEnergy {
    /// Dynamic energy of one read access (per burst beat).
    pub read: f64,
    /// Dynamic energy of one write access (per burst beat).
    pub write: f64,
    /// Leakage power of one bank.
    pub leakage: f64,
}

impl MemoryEnergy {
    /// Parses the comma-separated result row (second line) of a CACTI output.
    pub fn parse(text: &str) -> Result<Self, BridgeError> {
        let row = text
            .lines()
            .nth(1)
            .ok_or_else(|| BridgeError::Cacti("expected a header line and a result line".to_owned()))?;
        let cols: Vec<&str> = row.trim().split(',').collect();

        let column = |idx: usize| -> Result<f64, BridgeError> {
            let text = cols
                .get(idx)
                .ok_or_else(|| BridgeError::Cacti(format!("result line has {} columns, need {}", cols.len(), CACTI_LEAKAGE_COL + 1)))?;
            text.trim()
                .parse::<f64>()
                .map_err(|_| BridgeError::Cacti(format!("column {idx} is not a number: `{}`", text.trim())))
        };

        Ok(Self {
            read: column(CACTI_READ_COL)?,
            write: column(CACTI_WRITE_COL)?,
            leakage: column(CACTI_LEAKAGE_COL)?,
        })
    }
}

/// Everything the bank power formula needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MemPowerInputs {
    /// Read bursts per bank.
    pub read_bursts: Vec<i64>,
    /// Write bursts per bank.
    pub write_bursts: Vec<i64>,
    /// Energy of one read access (CACTI energy times burst length).
    pub read_energy: f64,
    /// Energy of one write access (CACTI energy times burst length).
    pub write_energy: f64,
    /// Leakage per bank.
    pub leakage: f64,
    /// Sampling interval in nanoseconds.
    pub interval_ns: f64,
}

impl MemPowerInputs {
    /// Collects the bank geometry, burst counts and interval.
    ///
    /// # Arguments
    ///
    /// * `config` - gem5 configuration; provides `banks_per_rank`, `ranks_per_channel`
    ///   and `burst_length` of the first DRAM.
    /// * `stats` - gem5 statistics.
    /// * `energy` - Parsed CACTI energies.
    ///
    /// # Returns
    ///
    /// The inputs, `BridgeError::MissingSection` if the DRAM geometry is unavailable, or
    /// `BridgeError::MemoryStats` if `simSeconds` is missing or zero.
    pub fn gather(config: &ConfigStore, stats: &StatsStore, energy: MemoryEnergy) -> Result<Self, BridgeError> {
        let dram = |key: &str| -> Result<i64, BridgeError> {
            let path = format!("{DRAM}.{key}");
            config.int(&path).map_err(|e| BridgeError::MissingSection {
                path,
                reason: e.to_string(),
            })
        };
        let num_banks = usize::try_from(dram("banks_per_rank")? * dram("ranks_per_channel")?).unwrap_or(0);
        let burst_length = dram("burst_length")? as f64;

        let mut read_bursts = vec![0; num_banks];
        let mut write_bursts = vec![0; num_banks];
        let (mut next_read, mut next_write) = (0usize, 0usize);
        let mut interval_ns = None;

        for (name, _) in stats.iter() {
            if name.contains(READ_BURSTS) {
                assign_bank(&mut read_bursts, &mut next_read, name, stats.count(name));
            } else if name.contains(WRITE_BURSTS) {
                assign_bank(&mut write_bursts, &mut next_write, name, stats.count(name));
            } else if name.contains(SIM_SECONDS) {
                interval_ns = stats.value(name).ok().map(|s| s * NS_PER_S);
            }
        }

        let interval_ns = match interval_ns {
            Some(ns) if ns != 0.0 => ns,
            Some(_) => return Err(BridgeError::MemoryStats(format!("`{SIM_SECONDS}` is zero"))),
            None => return Err(BridgeError::MemoryStats(format!("`{SIM_SECONDS}` is missing"))),
        };

        tracing::debug!(num_banks, burst_length, interval_ns, "memory power inputs gathered");
        Ok(Self {
            read_bursts,
            write_bursts,
            read_energy: energy.read * burst_length,
            write_energy: energy.write * burst_length,
            leakage: energy.leakage,
            interval_ns,
        })
    }

    /// Number of banks.
    pub fn num_banks(&self) -> usize {
        self.read_bursts.len()
    }

    /// Power of every bank, rounded to three decimals.
    pub fn bank_powers(&self) -> Vec<f64> {
        self.read_bursts
            .iter()
            .zip(&self.write_bursts)
            .map(|(&rd, &wr)| {
                let dynamic = (rd as f64 * self.read_energy + wr as f64 * self.write_energy) / self.interval_ns;
                round3(dynamic + self.leakage)
            })
            .collect()
    }

    /// Renders the trace: `B_0\tB_1\t…` and a newline, then each bank power followed by a tab.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for bank in 0..self.num_banks() {
            out.push_str(&format!("B_{bank}\t"));
        }
        out.push('\n');
        for power in self.bank_powers() {
            out.push_str(&format_float(power));
            out.push('\t');
        }
        out
    }
}

/// Stores the next per-bank counter, ignoring counters past the configured bank count.
fn assign_bank(banks: &mut [i64], next: &mut usize, name: &str, count: Result<i64, LookupError>) {
    let count = count.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "bank counter unusable, counted as 0");
        0
    });
    match banks.get_mut(*next) {
        Some(slot) => *slot = count,
        None => tracing::warn!(stat = name, banks = banks.len(), "more bank counters than configured banks, ignored"),
    }
    *next += 1;
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}
