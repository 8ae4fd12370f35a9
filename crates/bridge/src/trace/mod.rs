//! Power trace I/O.
//!
//! HotSpot consumes a two-row tabular trace: channel names, then one value per channel.
//! This module provides:
//! 1. **Readers:** [`PowerTrace`] parsing for the McPAT-derived core trace (which may be
//!    preceded by `Warning` lines) and the per-bank memory trace.
//! 2. **Memory Power:** Per-bank power from gem5 burst counters and CACTI energies
//!    ([`mem_power`]).
//! 3. **Combination:** Column interleaving by a per-layer selector ([`combine`]).

use std::path::Path;

use crate::common::{BridgeError, read_file, write_file};
use crate::config::ConfigStore;
use crate::stats::StatsStore;

/// Layer-ordered interleaving of core and memory traces.
pub mod combine;
/// Per-bank memory power estimation.
pub mod mem_power;

pub use combine::{LayerKind, combine};
pub use mem_power::{MemPowerInputs, MemoryEnergy};

/// Prefix of diagnostic lines the power model prints ahead of its trace.
const WARNING_PREFIX: &str = "Warning";

/// A header row and a data row of whitespace-separated columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerTrace {
    /// Channel names.
    pub header: Vec<String>,
    /// Channel values, as text.
    pub data: Vec<String>,
}

impl PowerTrace {
    /// Parses a core power trace.
    ///
    /// Leading lines that start with `Warning` are skipped. The first other line is the
    /// header, the line after it is the data row.
    pub fn parse_core(text: &str) -> Result<Self, BridgeError> {
        let mut lines = text.lines().skip_while(|l| l.starts_with(WARNING_PREFIX));
        let header = lines.next().ok_or_else(|| missing("core", "header row"))?;
        let data = lines.next().ok_or_else(|| missing("core", "data row"))?;
        Ok(Self::from_rows(header, data))
    }

    /// Parses a memory power trace: the first line is the header, the second the data row.
    pub fn parse_memory(text: &str) -> Result<Self, BridgeError> {
        let mut lines = text.lines();
        let header = lines.next().ok_or_else(|| missing("memory", "header row"))?;
        let data = lines.next().ok_or_else(|| missing("memory", "data row"))?;
        Ok(Self::from_rows(header, data))
    }

    /// Reads and parses a core power trace file.
    pub fn load_core(path: &Path) -> Result<Self, BridgeError> {
        Self::parse_core(&read_file(path)?)
    }

    /// Reads and parses a memory power trace file.
    pub fn load_memory(path: &Path) -> Result<Self, BridgeError> {
        Self::parse_memory(&read_file(path)?)
    }

    fn from_rows(header: &str, data: &str) -> Self {
        let split = |row: &str| row.split_whitespace().map(str::to_owned).collect::<Vec<_>>();
        Self {
            header: split(header),
            data: split(data),
        }
    }

    /// Number of header columns.
    pub fn width(&self) -> usize {
        self.header.len()
    }
}

fn missing(name: &'static str, what: &str) -> BridgeError {
    BridgeError::Trace {
        name,
        reason: format!("missing {what}"),
    }
}

/// Reads two trace files and writes their layer-ordered combination.
///
/// # Arguments
///
/// * `core_path` - Core power trace.
/// * `memory_path` - Memory power trace.
/// * `selector` - One character per layer, bottom to top: `1` core, `0` memory.
/// * `banks_per_layer` - Memory columns consumed by each memory layer.
/// * `output_path` - Destination of the combined trace.
pub fn write_combined_trace(
    core_path: &Path,
    memory_path: &Path,
    selector: &str,
    banks_per_layer: usize,
    output_path: &Path,
) -> Result<(), BridgeError> {
    let layers = LayerKind::parse_selector(selector)?;
    let core = PowerTrace::load_core(core_path)?;
    let memory = PowerTrace::load_memory(memory_path)?;
    let combined = combine(&core, &memory, &layers, banks_per_layer);
    write_file(output_path, &combined)?;
    tracing::info!(path = %output_path.display(), layers = layers.len(), "combined power trace written");
    Ok(())
}

/// Reads gem5 and CACTI outputs and writes the per-bank memory power trace.
///
/// # Arguments
///
/// * `config_path` - gem5 `config.json`.
/// * `stats_path` - gem5 `stats.txt`.
/// * `cacti_path` - CACTI output with the per-access energies on its second line.
/// * `output_path` - Destination of the memory power trace.
pub fn write_mem_power_trace(
    config_path: &Path,
    stats_path: &Path,
    cacti_path: &Path,
    output_path: &Path,
) -> Result<(), BridgeError> {
    let config = ConfigStore::load(config_path)?;
    let stats = StatsStore::load(stats_path)?;
    let energy = MemoryEnergy::parse(&read_file(cacti_path)?)?;
    let inputs = MemPowerInputs::gather(&config, &stats, energy)?;
    write_file(output_path, &inputs.render())?;
    tracing::info!(path = %output_path.display(), banks = inputs.num_banks(), "memory power trace written");
    Ok(())
}
